//! Likes, views and comments

use std::sync::Arc;

use atelier_core::models::{
    Artwork, Comment, CommentListQuery, CommentListResponse, CreateCommentRequest,
    EngagementOutcome,
};
use atelier_core::validation::{is_valid_sanitized_input_with_ratio, sanitize_comment};
use atelier_core::{AppError, PageRequest};
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::middleware::audit;
use crate::state::AppState;
use crate::utils::ClientIp;

const ANONYMOUS_VIEWER: &str = "anonymous";

async fn load_artwork(state: &AppState, id: Uuid) -> Result<Artwork, AppError> {
    state
        .artworks
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Artwork {} not found", id)))
}

/// Viewer identity for view de-duplication: the user when signed in,
/// otherwise the client address.
pub fn viewer_key(user: Option<AuthUser>, client_ip: Option<&str>) -> String {
    match (user, client_ip) {
        (Some(user), _) => format!("user:{}", user.user_id),
        (None, Some(ip)) => format!("ip:{}", ip),
        (None, None) => ANONYMOUS_VIEWER.to_string(),
    }
}

#[utoipa::path(
    post,
    path = "/api/artworks/{id}/like",
    tag = "engagement",
    params(("id" = Uuid, Path, description = "Artwork ID")),
    responses(
        (status = 200, description = "Like recorded (idempotent)", body = EngagementOutcome),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Artwork not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, id), fields(user_id = %user.user_id))]
pub async fn like_artwork(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<EngagementOutcome>, HttpAppError> {
    let Path(id) = id?;
    let outcome = state.engagement.like(id, user.user_id).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    delete,
    path = "/api/artworks/{id}/like",
    tag = "engagement",
    params(("id" = Uuid, Path, description = "Artwork ID")),
    responses(
        (status = 200, description = "Like removed (idempotent)", body = EngagementOutcome),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Artwork not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, id), fields(user_id = %user.user_id))]
pub async fn unlike_artwork(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<EngagementOutcome>, HttpAppError> {
    let Path(id) = id?;
    let outcome = state.engagement.unlike(id, user.user_id).await?;
    Ok(Json(outcome))
}

/// Count a view
///
/// Anonymous callers are keyed by client address. Repeat views inside the
/// cooldown window are acknowledged without touching the database. The window
/// only starts once a view has been written.
#[utoipa::path(
    post,
    path = "/api/artworks/{id}/view",
    tag = "engagement",
    params(("id" = Uuid, Path, description = "Artwork ID")),
    responses(
        (status = 200, description = "View processed", body = EngagementOutcome),
        (status = 404, description = "Artwork not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn record_view(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
    ClientIp(client_ip): ClientIp,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<EngagementOutcome>, HttpAppError> {
    let Path(id) = id?;
    let artwork = load_artwork(&state, id).await?;
    let key = viewer_key(user, client_ip.as_deref());

    if !state.view_tracker.should_count(id, &key).await {
        tracing::debug!(artwork_id = %id, "View inside cooldown window, not counted");
        return Ok(Json(EngagementOutcome {
            changed: false,
            count: artwork.view_count,
        }));
    }

    let outcome = state.engagement.record_view(id, &key).await?;
    state.view_tracker.mark_counted(id, &key).await;
    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/api/artworks/{id}/comments",
    tag = "engagement",
    params(("id" = Uuid, Path, description = "Artwork ID"), CommentListQuery),
    responses(
        (status = 200, description = "Comments, oldest first", body = CommentListResponse),
        (status = 404, description = "Artwork not found", body = ErrorResponse)
    )
)]
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<CommentListQuery>, QueryRejection>,
) -> Result<Json<CommentListResponse>, HttpAppError> {
    let Path(id) = id?;
    let Query(query) = query?;
    query.validate()?;

    load_artwork(&state, id).await?;
    let page = state
        .engagement
        .list_comments(id, PageRequest::new(query.page, query.per_page))
        .await?;

    Ok(Json(CommentListResponse {
        comments: page.items,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
        total_pages: page.total_pages,
    }))
}

#[utoipa::path(
    post,
    path = "/api/artworks/{id}/comments",
    tag = "engagement",
    params(("id" = Uuid, Path, description = "Artwork ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 400, description = "Invalid comment", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Artwork not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, client_ip, id, request), fields(user_id = %user.user_id))]
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ClientIp(client_ip): ClientIp,
    id: Result<Path<Uuid>, PathRejection>,
    ValidatedJson(request): ValidatedJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), HttpAppError> {
    let Path(id) = id?;
    request.validate()?;

    let body = sanitize_comment(&request.body);
    audit::log_sanitization(Some(user.user_id), "comment", &request.body, &body, client_ip);
    if !is_valid_sanitized_input_with_ratio(request.body.trim(), &body, state.min_retained_ratio) {
        return Err(AppError::InvalidInput(
            "Comment contains invalid or disallowed content".to_string(),
        )
        .into());
    }

    let comment = state.engagement.add_comment(id, user.user_id, body).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
