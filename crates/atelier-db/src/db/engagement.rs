//! Likes, views and comments.
//!
//! De-duplication relies on the unique indexes of `artwork_likes` and
//! `artwork_views`; a conflicting insert is a no-op, not an error. Counter
//! columns on `artworks` move in the same transaction as the row they count.

use async_trait::async_trait;
use atelier_core::models::{Comment, EngagementOutcome};
use atelier_core::{AppError, PageRequest, Paginated};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::is_foreign_key_violation;

#[async_trait]
pub trait EngagementStore: Send + Sync {
    /// Like an artwork. Liking twice leaves the count unchanged.
    async fn like(&self, artwork_id: Uuid, user_id: Uuid) -> Result<EngagementOutcome, AppError>;

    /// Remove a like. The count never drops below zero.
    async fn unlike(&self, artwork_id: Uuid, user_id: Uuid)
        -> Result<EngagementOutcome, AppError>;

    /// Record a view by `viewer_key` (a user id or a client address).
    async fn record_view(
        &self,
        artwork_id: Uuid,
        viewer_key: &str,
    ) -> Result<EngagementOutcome, AppError>;

    /// Insert an already sanitized comment and bump the comment count.
    async fn add_comment(
        &self,
        artwork_id: Uuid,
        user_id: Uuid,
        body: String,
    ) -> Result<Comment, AppError>;

    /// Oldest first.
    async fn list_comments(
        &self,
        artwork_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<Comment>, AppError>;
}

#[derive(Clone)]
pub struct EngagementRepository {
    pool: PgPool,
}

impl EngagementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn artwork_not_found(artwork_id: Uuid) -> AppError {
    AppError::NotFound(format!("Artwork {} not found", artwork_id))
}

fn map_write_error(err: sqlx::Error, artwork_id: Uuid) -> AppError {
    if is_foreign_key_violation(&err) {
        artwork_not_found(artwork_id)
    } else {
        AppError::from(err)
    }
}

#[async_trait]
impl EngagementStore for EngagementRepository {
    #[tracing::instrument(skip(self), fields(db.table = "artwork_likes", db.operation = "insert", db.record_id = %artwork_id))]
    async fn like(&self, artwork_id: Uuid, user_id: Uuid) -> Result<EngagementOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO artwork_likes (artwork_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (artwork_id, user_id) DO NOTHING
            "#,
        )
        .bind(artwork_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, artwork_id))?
        .rows_affected()
            > 0;

        let count: Option<i64> = if inserted {
            sqlx::query_scalar(
                "UPDATE artworks SET like_count = like_count + 1 WHERE id = $1 RETURNING like_count",
            )
            .bind(artwork_id)
            .fetch_optional(&mut *tx)
            .await?
        } else {
            sqlx::query_scalar("SELECT like_count FROM artworks WHERE id = $1")
                .bind(artwork_id)
                .fetch_optional(&mut *tx)
                .await?
        };
        let count = count.ok_or_else(|| artwork_not_found(artwork_id))?;

        tx.commit().await?;

        Ok(EngagementOutcome {
            changed: inserted,
            count,
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "artwork_likes", db.operation = "delete", db.record_id = %artwork_id))]
    async fn unlike(
        &self,
        artwork_id: Uuid,
        user_id: Uuid,
    ) -> Result<EngagementOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM artwork_likes WHERE artwork_id = $1 AND user_id = $2")
            .bind(artwork_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        let count: Option<i64> = if removed {
            sqlx::query_scalar(
                r#"
                UPDATE artworks SET like_count = GREATEST(like_count - 1, 0)
                WHERE id = $1
                RETURNING like_count
                "#,
            )
            .bind(artwork_id)
            .fetch_optional(&mut *tx)
            .await?
        } else {
            sqlx::query_scalar("SELECT like_count FROM artworks WHERE id = $1")
                .bind(artwork_id)
                .fetch_optional(&mut *tx)
                .await?
        };
        let count = count.ok_or_else(|| artwork_not_found(artwork_id))?;

        tx.commit().await?;

        Ok(EngagementOutcome {
            changed: removed,
            count,
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "artwork_views", db.operation = "insert", db.record_id = %artwork_id))]
    async fn record_view(
        &self,
        artwork_id: Uuid,
        viewer_key: &str,
    ) -> Result<EngagementOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO artwork_views (artwork_id, viewer_key)
            VALUES ($1, $2)
            ON CONFLICT (artwork_id, viewer_key) DO NOTHING
            "#,
        )
        .bind(artwork_id)
        .bind(viewer_key)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, artwork_id))?
        .rows_affected()
            > 0;

        let count: Option<i64> = if inserted {
            sqlx::query_scalar(
                "UPDATE artworks SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
            )
            .bind(artwork_id)
            .fetch_optional(&mut *tx)
            .await?
        } else {
            sqlx::query_scalar("SELECT view_count FROM artworks WHERE id = $1")
                .bind(artwork_id)
                .fetch_optional(&mut *tx)
                .await?
        };
        let count = count.ok_or_else(|| artwork_not_found(artwork_id))?;

        tx.commit().await?;

        Ok(EngagementOutcome {
            changed: inserted,
            count,
        })
    }

    #[tracing::instrument(skip(self, body), fields(db.table = "artwork_comments", db.operation = "insert", db.record_id = %artwork_id))]
    async fn add_comment(
        &self,
        artwork_id: Uuid,
        user_id: Uuid,
        body: String,
    ) -> Result<Comment, AppError> {
        let mut tx = self.pool.begin().await?;

        let comment = sqlx::query_as::<Postgres, Comment>(
            r#"
            INSERT INTO artwork_comments (id, artwork_id, user_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, artwork_id, user_id, body, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(artwork_id)
        .bind(user_id)
        .bind(&body)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, artwork_id))?;

        sqlx::query("UPDATE artworks SET comment_count = comment_count + 1 WHERE id = $1")
            .bind(artwork_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(comment)
    }

    #[tracing::instrument(skip(self), fields(db.table = "artwork_comments", db.operation = "select", db.record_id = %artwork_id))]
    async fn list_comments(
        &self,
        artwork_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<Comment>, AppError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM artwork_comments WHERE artwork_id = $1")
                .bind(artwork_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<Postgres, Comment>(
            r#"
            SELECT id, artwork_id, user_id, body, created_at
            FROM artwork_comments
            WHERE artwork_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(artwork_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated::new(rows, page, total))
    }
}
