use std::sync::Arc;

use atelier_core::models::{
    Artwork, ArtworkListQuery, ArtworkListResponse, UploadArtworkResponse,
};
use atelier_core::{AppError, PageRequest};
use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{PathRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::middleware::audit;
use crate::services::{ArtworkLifecycleService, ArtworkUploadService};
use crate::state::AppState;
use crate::utils::{extract_artwork_form, ClientIp};

/// Upload a new artwork
///
/// Multipart fields: `title`, `description`, `category` and `imageFile`.
/// The image goes through the security pipeline before anything is stored.
#[utoipa::path(
    post,
    path = "/api/artworks",
    tag = "artworks",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Artwork uploaded", body = UploadArtworkResponse),
        (status = 400, description = "Invalid input or upload blocked", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, client_ip, multipart), fields(user_id = %user.user_id, operation = "upload_artwork"))]
pub async fn upload_artwork(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ClientIp(client_ip): ClientIp,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadArtworkResponse>), HttpAppError> {
    let multipart = multipart.map_err(|e| {
        AppError::InvalidInput(format!("Expected a multipart/form-data body: {}", e))
    })?;
    let form = extract_artwork_form(multipart).await?;

    let response = ArtworkUploadService::new(&state)
        .upload(user, form, client_ip)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// List artworks, newest first
#[utoipa::path(
    get,
    path = "/api/artworks",
    tag = "artworks",
    params(ArtworkListQuery),
    responses(
        (status = 200, description = "Page of artworks", body = ArtworkListResponse),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query))]
pub async fn list_artworks(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ArtworkListQuery>, QueryRejection>,
) -> Result<Json<ArtworkListResponse>, HttpAppError> {
    let Query(query) = query?;
    query.validate()?;

    let request = PageRequest::new(query.page, query.per_page);
    let page = state.artworks.list(request, query.category).await?;
    let page_numbers = page.page_numbers();

    Ok(Json(ArtworkListResponse {
        artworks: page.items,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
        total_pages: page.total_pages,
        page_numbers,
    }))
}

#[utoipa::path(
    get,
    path = "/api/artworks/{id}",
    tag = "artworks",
    params(("id" = Uuid, Path, description = "Artwork ID")),
    responses(
        (status = 200, description = "Artwork", body = Artwork),
        (status = 404, description = "Artwork not found", body = ErrorResponse)
    )
)]
pub async fn get_artwork(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Artwork>, HttpAppError> {
    let Path(id) = id?;
    let artwork = state
        .artworks
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Artwork {} not found", id)))?;
    Ok(Json(artwork))
}

/// Delete an artwork (owner or admin)
#[utoipa::path(
    delete,
    path = "/api/artworks/{id}",
    tag = "artworks",
    params(("id" = Uuid, Path, description = "Artwork ID")),
    responses(
        (status = 204, description = "Artwork deleted"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Artwork not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, client_ip, id), fields(user_id = %user.user_id))]
pub async fn delete_artwork(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ClientIp(client_ip): ClientIp,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, HttpAppError> {
    let Path(id) = id?;
    ArtworkLifecycleService::delete_artwork(&state.artworks, &state.storage, user, id).await?;
    audit::log_artwork_deleted(user.user_id, id, client_ip);
    Ok(StatusCode::NO_CONTENT)
}
