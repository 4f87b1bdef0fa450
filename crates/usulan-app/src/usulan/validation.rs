use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;
use usulan_types::ValidEmail;

use super::submission::{ImageUpload, MAX_IMAGE_SIZE_KB, UsulanSubmission};

pub const MIN_YEAR: i32 = 1900;

/// Field name to list of violation messages, collected across ALL rules
/// before any side effect happens.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Single-field report for a uniqueness conflict that slipped past the
    /// pre-check and bounced off the database index.
    pub fn taken(field: &str) -> Self {
        let mut errors = Self::new();
        errors.push(field, taken_message(field));
        errors
    }
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

fn required_message(field: &str) -> String {
    format!("The {} field is required.", label(field))
}

pub fn taken_message(field: &str) -> String {
    format!("The {} has already been taken.", label(field))
}

/// Submission with every field rule satisfied; isbn uniqueness and image
/// checks are separate.
#[derive(Debug)]
pub struct ValidSubmission {
    pub judul: String,
    pub isbn: String,
    pub penulis: String,
    pub penerbit: String,
    pub tahun_terbit: i32,
    pub kategori: String,
    pub pengusul_email: String,
}

fn required_text(field: &str, value: &Option<String>, errors: &mut FieldErrors) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.push(field, required_message(field));
            None
        }
    }
}

fn check_year(
    field: &str,
    value: &Option<String>,
    current_year: i32,
    errors: &mut FieldErrors,
) -> Option<i32> {
    let value = required_text(field, value, errors)?;
    if value.len() != 4 || !value.chars().all(|c| c.is_ascii_digit()) {
        errors.push(field, format!("The {} field must be 4 digits.", label(field)));
        return None;
    }
    let year: i32 = match value.parse() {
        Ok(year) => year,
        Err(_) => {
            errors.push(
                field,
                format!("The {} field must be an integer.", label(field)),
            );
            return None;
        }
    };
    if year < MIN_YEAR {
        errors.push(
            field,
            format!("The {} field must be at least {MIN_YEAR}.", label(field)),
        );
        return None;
    }
    if year > current_year {
        errors.push(
            field,
            format!(
                "The {} field must not be greater than {current_year}.",
                label(field)
            ),
        );
        return None;
    }
    Some(year)
}

fn check_email(field: &str, value: &Option<String>, errors: &mut FieldErrors) -> Option<String> {
    let value = required_text(field, value, errors)?;
    if ValidEmail::from_str(&value).is_err() {
        errors.push(
            field,
            format!("The {} field must be a valid email address.", label(field)),
        );
        return None;
    }
    Some(value)
}

/// Runs every field rule and returns the typed submission only when all of
/// them passed. Violations accumulate in `errors`.
pub fn check_fields(
    submission: &UsulanSubmission,
    current_year: i32,
    errors: &mut FieldErrors,
) -> Option<ValidSubmission> {
    let judul = required_text("judul", &submission.judul, errors);
    let isbn = required_text("isbn", &submission.isbn, errors);
    let penulis = required_text("penulis", &submission.penulis, errors);
    let penerbit = required_text("penerbit", &submission.penerbit, errors);
    let tahun_terbit = check_year("tahun_terbit", &submission.tahun_terbit, current_year, errors);
    let kategori = required_text("kategori", &submission.kategori, errors);
    let pengusul_email = check_email("pengusul_email", &submission.pengusul_email, errors);

    match (
        judul,
        isbn,
        penulis,
        penerbit,
        tahun_terbit,
        kategori,
        pengusul_email,
    ) {
        (
            Some(judul),
            Some(isbn),
            Some(penulis),
            Some(penerbit),
            Some(tahun_terbit),
            Some(kategori),
            Some(pengusul_email),
        ) => Some(ValidSubmission {
            judul,
            isbn,
            penulis,
            penerbit,
            tahun_terbit,
            kategori,
            pengusul_email,
        }),
        _ => None,
    }
}

pub enum ImageRule {
    Required,
    Optional,
}

/// Image checks in rule order: presence, format, size.
pub fn check_image<'a>(
    image: Option<&'a ImageUpload>,
    rule: ImageRule,
    errors: &mut FieldErrors,
) -> Option<&'a ImageUpload> {
    let image = match (image, rule) {
        (Some(image), _) => image,
        (None, ImageRule::Required) => {
            errors.push("image", required_message("image"));
            return None;
        }
        (None, ImageRule::Optional) => return None,
    };
    let mut valid = true;
    if image.format_extension().is_none() {
        errors.push(
            "image",
            "The image field must be a file of type: jpeg, png, jpg, gif, svg.",
        );
        valid = false;
    }
    if image.data.len() > MAX_IMAGE_SIZE_KB * 1024 {
        errors.push(
            "image",
            format!("The image field must not be greater than {MAX_IMAGE_SIZE_KB} kilobytes."),
        );
        valid = false;
    }
    valid.then_some(image)
}
