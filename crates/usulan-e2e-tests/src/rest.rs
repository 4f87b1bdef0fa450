use anyhow::Result;
use reqwest::{
    Url,
    multipart::{Form, Part},
};
use serde_json::Value;
use tracing::info;

/// Minimal JFIF header, enough to pose as a jpeg upload.
pub const SAMPLE_JPEG: &[u8] = &[
    0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 0x4a, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0xff, 0xd9,
];

pub const SAMPLE_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52,
];

pub fn usulan_form(judul: &str, isbn: &str) -> Form {
    Form::new()
        .text("judul", judul.to_string())
        .text("isbn", isbn.to_string())
        .text("penulis", "Robert C. Martin")
        .text("penerbit", "Prentice Hall")
        .text("tahun_terbit", "2008")
        .text("kategori", "Software")
        .text("pengusul_email", "a@b.com")
}

pub fn with_image(form: Form, data: &[u8], file_name: &str, mime: &str) -> Result<Form> {
    let part = Part::bytes(data.to_vec())
        .file_name(file_name.to_string())
        .mime_str(mime)?;
    Ok(form.part("image", part))
}

pub async fn create_usulan(
    client: &reqwest::Client,
    base_url: &Url,
    judul: &str,
    isbn: &str,
) -> Result<Value> {
    let form = with_image(usulan_form(judul, isbn), SAMPLE_JPEG, "sampul.jpg", "image/jpeg")?;
    let api_url = base_url.join("usulan-buku")?;

    let response = client.post(api_url).multipart(form).send().await?;
    info!("Response: {:#?}", response);
    assert!(response.status().as_u16() == 201);

    let body: Value = response.json().await?;
    assert_eq!(body["success"], true);
    Ok(body["data"].clone())
}

/// Blob key from the public image URL of a record payload.
pub fn image_key(record: &Value) -> String {
    let url = record["image"].as_str().expect("image url");
    url.rsplit('/').next().expect("image key").to_string()
}
