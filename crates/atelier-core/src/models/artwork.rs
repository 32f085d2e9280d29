use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::pagination::PageItem;

/// Fixed set of artwork categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "artwork_category", rename_all = "kebab-case")
)]
#[serde(rename_all = "kebab-case")]
pub enum ArtworkCategory {
    Painting,
    DigitalArt,
    Photography,
    Sculpture,
    MixedMedia,
    Drawing,
    Other,
}

impl ArtworkCategory {
    pub const ALL: [ArtworkCategory; 7] = [
        ArtworkCategory::Painting,
        ArtworkCategory::DigitalArt,
        ArtworkCategory::Photography,
        ArtworkCategory::Sculpture,
        ArtworkCategory::MixedMedia,
        ArtworkCategory::Drawing,
        ArtworkCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtworkCategory::Painting => "painting",
            ArtworkCategory::DigitalArt => "digital-art",
            ArtworkCategory::Photography => "photography",
            ArtworkCategory::Sculpture => "sculpture",
            ArtworkCategory::MixedMedia => "mixed-media",
            ArtworkCategory::Drawing => "drawing",
            ArtworkCategory::Other => "other",
        }
    }
}

/// Error returned when a category string is not one of [`ArtworkCategory::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid category: {0}")]
pub struct InvalidCategory(pub String);

impl FromStr for ArtworkCategory {
    type Err = InvalidCategory;

    /// Exact match only. "Painting" or " painting" are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtworkCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| InvalidCategory(s.to_string()))
    }
}

impl Display for ArtworkCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Artwork row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ArtworkCategory,
    pub image_url: String,
    #[serde(skip_serializing, default)]
    pub storage_key: String,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub width: i32,
    pub height: i32,
    pub like_count: i64,
    pub view_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for inserting a freshly uploaded artwork. Text fields are already sanitized.
#[derive(Debug, Clone)]
pub struct NewArtwork {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ArtworkCategory,
    pub image_url: String,
    pub storage_key: String,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub width: i32,
    pub height: i32,
}

/// Query parameters for listing artworks
#[derive(Debug, Clone, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ArtworkListQuery {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "per_page must be between 1 and 100"))]
    pub per_page: Option<i64>,
    pub category: Option<ArtworkCategory>,
}

/// Response body for a successful upload
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadArtworkResponse {
    pub success: bool,
    pub artwork: Artwork,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

/// Paginated artwork listing with pre-computed page links
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkListResponse {
    pub artworks: Vec<Artwork>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
    #[schema(value_type = Vec<Object>)]
    pub page_numbers: Vec<PageItem>,
}

/// Counter values after a like/unlike/view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EngagementOutcome {
    /// Whether this call changed anything (false for a repeated like or view)
    pub changed: bool,
    pub count: i64,
}
