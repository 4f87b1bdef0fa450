use axum::{
    body::Body,
    extract::{Path, State},
    response::Response,
    routing::get,
};
use http::header;
use usulan_store::{Store as _, StorePrefix, ValidPath};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Streams a stored image blob by its key.
pub async fn download_image(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Response> {
    let path = ValidPath::new(key.as_str())?.with_prefix(StorePrefix::Usulans);
    let stream = state.store().load_data(&path).await?;
    let mime = new_mime_guess::from_path(&key).first_or_octet_stream();
    let response = Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(e.into()))?;
    Ok(response)
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/usulans/{key}", get(download_image))
}
