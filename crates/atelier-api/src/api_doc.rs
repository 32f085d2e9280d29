//! OpenAPI documentation, served at `/api/openapi.json` and browsable at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use atelier_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atelier API",
        version = "0.1.0",
        description = "Art gallery backend: artwork uploads with image security checks, browsing, likes, views and comments. Authenticated endpoints take a bearer token or the `session` cookie."
    ),
    paths(
        // Artworks
        handlers::artworks::upload_artwork,
        handlers::artworks::list_artworks,
        handlers::artworks::get_artwork,
        handlers::artworks::delete_artwork,
        // Engagement
        handlers::engagement::like_artwork,
        handlers::engagement::unlike_artwork,
        handlers::engagement::record_view,
        handlers::engagement::list_comments,
        handlers::engagement::create_comment,
        // Media
        handlers::media::serve_media,
        // Health
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::Artwork,
            models::ArtworkCategory,
            models::UploadArtworkResponse,
            models::ArtworkListResponse,
            models::EngagementOutcome,
            models::Comment,
            models::CreateCommentRequest,
            models::CommentListResponse,
            handlers::health::HealthResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "artworks", description = "Artwork upload, browsing and deletion"),
        (name = "engagement", description = "Likes, views and comments"),
        (name = "media", description = "Stored artwork images"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
