//! Serves stored artwork images for the local filesystem backend.

use std::sync::Arc;

use atelier_core::validation::file_extension;
use atelier_processing::validator::expected_content_type;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

const MEDIA_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

#[utoipa::path(
    get,
    path = "/media/{key}",
    tag = "media",
    params(("key" = String, Path, description = "Storage key, e.g. artworks/{owner}/{file}")),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid key", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn serve_media(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, HttpAppError> {
    let data = state.storage.download(&key).await?;

    // Keys are generated from sanitized image filenames, so the extension is trustworthy.
    let content_type = file_extension(&key)
        .as_deref()
        .and_then(expected_content_type)
        .unwrap_or("application/octet-stream");

    let mut response = data.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(MEDIA_CACHE_CONTROL),
    );
    Ok(response)
}
