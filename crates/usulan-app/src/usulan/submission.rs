use axum::extract::Multipart;
use bytes::Bytes;
use tracing::debug;
use usulan_types::utils::file_ext;

use crate::error::ApiResult;

pub const MAX_IMAGE_SIZE_KB: usize = 2048;

/// Accepted upload formats: declared mime type and the extension the blob
/// is stored under.
const ALLOWED_IMAGE_FORMATS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/svg+xml", "svg"),
];

/// Raw submitted fields, distinct from the persisted record. Anything not
/// named here is dropped during multipart parsing.
#[derive(Debug, Clone, Default)]
pub struct UsulanSubmission {
    pub judul: Option<String>,
    pub isbn: Option<String>,
    pub penulis: Option<String>,
    pub penerbit: Option<String>,
    pub tahun_terbit: Option<String>,
    pub kategori: Option<String>,
    pub pengusul_email: Option<String>,
}

impl UsulanSubmission {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "judul" => self.judul = Some(value),
            "isbn" => self.isbn = Some(value),
            "penulis" => self.penulis = Some(value),
            "penerbit" => self.penerbit = Some(value),
            "tahun_terbit" => self.tahun_terbit = Some(value),
            "kategori" => self.kategori = Some(value),
            "pengusul_email" => self.pengusul_email = Some(value),
            other => debug!("Ignoring unknown form field {other}"),
        }
    }

    pub fn submitted_isbn(&self) -> Option<&str> {
        self.isbn
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Bytes,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl ImageUpload {
    /// Extension for the stored blob, None when the upload is not one of
    /// the accepted image formats. Declared content type wins, file name
    /// extension is the fallback.
    pub fn format_extension(&self) -> Option<&'static str> {
        if let Some(ct) = self.content_type.as_deref() {
            return ALLOWED_IMAGE_FORMATS
                .iter()
                .find(|(mime, _)| *mime == ct)
                .map(|(_, ext)| *ext);
        }
        let ext = file_ext(self.file_name.as_deref()?)?;
        match ext.as_str() {
            "jpg" | "jpeg" => Some("jpg"),
            "png" => Some("png"),
            "gif" => Some("gif"),
            "svg" => Some("svg"),
            _ => None,
        }
    }
}

/// Parsed multipart request body: submitted fields plus an optional image.
#[derive(Debug, Default)]
pub struct SubmissionForm {
    pub submission: UsulanSubmission,
    pub image: Option<ImageUpload>,
}

impl SubmissionForm {
    pub async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = SubmissionForm::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(ToString::to_string) else {
                continue;
            };
            if name == "image" {
                let content_type = field.content_type().map(ToString::to_string);
                let file_name = field.file_name().map(ToString::to_string);
                let data = field.bytes().await?;
                // browsers send an empty part for a file input left blank
                if data.is_empty() && file_name.as_deref().unwrap_or("").is_empty() {
                    continue;
                }
                form.image = Some(ImageUpload {
                    data,
                    content_type,
                    file_name,
                });
            } else {
                let value = field.text().await?;
                form.submission.set(&name, value);
            }
        }
        Ok(form)
    }
}
