use async_trait::async_trait;
use atelier_core::models::{Artwork, ArtworkCategory, NewArtwork};
use atelier_core::{AppError, PageRequest, Paginated};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Artwork persistence
#[async_trait]
pub trait ArtworkStore: Send + Sync {
    async fn insert(&self, artwork: NewArtwork) -> Result<Artwork, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Artwork>, AppError>;

    /// Newest first, optionally restricted to one category.
    async fn list(
        &self,
        page: PageRequest,
        category: Option<ArtworkCategory>,
    ) -> Result<Paginated<Artwork>, AppError>;

    /// Delete the row (likes, views and comments cascade). Returns whether a row existed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct ArtworkRepository {
    pool: PgPool,
}

impl ArtworkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtworkStore for ArtworkRepository {
    #[tracing::instrument(skip(self, artwork), fields(db.table = "artworks", db.operation = "insert", db.record_id = %artwork.id))]
    async fn insert(&self, artwork: NewArtwork) -> Result<Artwork, AppError> {
        let row = sqlx::query_as::<Postgres, Artwork>(
            r#"
            INSERT INTO artworks (
                id, user_id, title, description, category,
                image_url, storage_key, original_filename, content_type,
                file_size, width, height
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(artwork.id)
        .bind(artwork.user_id)
        .bind(&artwork.title)
        .bind(&artwork.description)
        .bind(artwork.category)
        .bind(&artwork.image_url)
        .bind(&artwork.storage_key)
        .bind(&artwork.original_filename)
        .bind(&artwork.content_type)
        .bind(artwork.file_size)
        .bind(artwork.width)
        .bind(artwork.height)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "artworks", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Artwork>, AppError> {
        let row = sqlx::query_as::<Postgres, Artwork>("SELECT * FROM artworks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "artworks", db.operation = "select"))]
    async fn list(
        &self,
        page: PageRequest,
        category: Option<ArtworkCategory>,
    ) -> Result<Paginated<Artwork>, AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM artworks WHERE ($1::artwork_category IS NULL OR category = $1)",
        )
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<Postgres, Artwork>(
            r#"
            SELECT * FROM artworks
            WHERE ($1::artwork_category IS NULL OR category = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated::new(rows, page, total))
    }

    #[tracing::instrument(skip(self), fields(db.table = "artworks", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query("DELETE FROM artworks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
