//! In-memory gallery store, for tests and running without Postgres.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use atelier_core::models::{Artwork, ArtworkCategory, Comment, EngagementOutcome, NewArtwork};
use atelier_core::{AppError, PageRequest, Paginated};
use chrono::Utc;
use uuid::Uuid;

use super::artwork::ArtworkStore;
use super::engagement::EngagementStore;

#[derive(Default)]
struct GalleryState {
    artworks: HashMap<Uuid, Artwork>,
    likes: HashSet<(Uuid, Uuid)>,
    views: HashSet<(Uuid, String)>,
    comments: Vec<Comment>,
}

/// Implements both [`ArtworkStore`] and [`EngagementStore`] over shared maps,
/// with the same de-duplication and counter rules as the Postgres schema.
/// Artwork inserts and view writes can be made to fail on demand.
#[derive(Default)]
pub struct InMemoryGalleryStore {
    state: Mutex<GalleryState>,
    fail_inserts: AtomicBool,
    fail_views: AtomicBool,
}

impl InMemoryGalleryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, GalleryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_views(&self, fail: bool) {
        self.fail_views.store(fail, Ordering::SeqCst);
    }

    pub fn artwork_count(&self) -> usize {
        self.state().artworks.len()
    }
}

fn artwork_not_found(artwork_id: Uuid) -> AppError {
    AppError::NotFound(format!("Artwork {} not found", artwork_id))
}

fn page_slice<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(0);
    items.iter().skip(offset).take(limit).cloned().collect()
}

#[async_trait]
impl ArtworkStore for InMemoryGalleryStore {
    async fn insert(&self, artwork: NewArtwork) -> Result<Artwork, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let now = Utc::now();
        let row = Artwork {
            id: artwork.id,
            user_id: artwork.user_id,
            title: artwork.title,
            description: artwork.description,
            category: artwork.category,
            image_url: artwork.image_url,
            storage_key: artwork.storage_key,
            original_filename: artwork.original_filename,
            content_type: artwork.content_type,
            file_size: artwork.file_size,
            width: artwork.width,
            height: artwork.height,
            like_count: 0,
            view_count: 0,
            comment_count: 0,
            created_at: now,
            updated_at: now,
        };

        self.state().artworks.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Artwork>, AppError> {
        Ok(self.state().artworks.get(&id).cloned())
    }

    async fn list(
        &self,
        page: PageRequest,
        category: Option<ArtworkCategory>,
    ) -> Result<Paginated<Artwork>, AppError> {
        let state = self.state();
        let mut matching: Vec<&Artwork> = state
            .artworks
            .values()
            .filter(|a| category.is_none_or(|c| a.category == c))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let items: Vec<Artwork> = page_slice(&matching, page).into_iter().cloned().collect();
        Ok(Paginated::new(items, page, total))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state();
        if state.artworks.remove(&id).is_none() {
            return Ok(false);
        }
        state.likes.retain(|(artwork_id, _)| *artwork_id != id);
        state.views.retain(|(artwork_id, _)| *artwork_id != id);
        state.comments.retain(|c| c.artwork_id != id);
        Ok(true)
    }
}

#[async_trait]
impl EngagementStore for InMemoryGalleryStore {
    async fn like(&self, artwork_id: Uuid, user_id: Uuid) -> Result<EngagementOutcome, AppError> {
        let mut state = self.state();
        if !state.artworks.contains_key(&artwork_id) {
            return Err(artwork_not_found(artwork_id));
        }
        let changed = state.likes.insert((artwork_id, user_id));
        let artwork = state
            .artworks
            .get_mut(&artwork_id)
            .ok_or_else(|| artwork_not_found(artwork_id))?;
        if changed {
            artwork.like_count += 1;
        }
        Ok(EngagementOutcome {
            changed,
            count: artwork.like_count,
        })
    }

    async fn unlike(
        &self,
        artwork_id: Uuid,
        user_id: Uuid,
    ) -> Result<EngagementOutcome, AppError> {
        let mut state = self.state();
        if !state.artworks.contains_key(&artwork_id) {
            return Err(artwork_not_found(artwork_id));
        }
        let changed = state.likes.remove(&(artwork_id, user_id));
        let artwork = state
            .artworks
            .get_mut(&artwork_id)
            .ok_or_else(|| artwork_not_found(artwork_id))?;
        if changed {
            artwork.like_count = (artwork.like_count - 1).max(0);
        }
        Ok(EngagementOutcome {
            changed,
            count: artwork.like_count,
        })
    }

    async fn record_view(
        &self,
        artwork_id: Uuid,
        viewer_key: &str,
    ) -> Result<EngagementOutcome, AppError> {
        if self.fail_views.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut state = self.state();
        if !state.artworks.contains_key(&artwork_id) {
            return Err(artwork_not_found(artwork_id));
        }
        let changed = state.views.insert((artwork_id, viewer_key.to_string()));
        let artwork = state
            .artworks
            .get_mut(&artwork_id)
            .ok_or_else(|| artwork_not_found(artwork_id))?;
        if changed {
            artwork.view_count += 1;
        }
        Ok(EngagementOutcome {
            changed,
            count: artwork.view_count,
        })
    }

    async fn add_comment(
        &self,
        artwork_id: Uuid,
        user_id: Uuid,
        body: String,
    ) -> Result<Comment, AppError> {
        let mut state = self.state();
        let artwork = state
            .artworks
            .get_mut(&artwork_id)
            .ok_or_else(|| artwork_not_found(artwork_id))?;
        artwork.comment_count += 1;

        let comment = Comment {
            id: Uuid::new_v4(),
            artwork_id,
            user_id,
            body,
            created_at: Utc::now(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(
        &self,
        artwork_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<Comment>, AppError> {
        let state = self.state();
        let matching: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.artwork_id == artwork_id)
            .cloned()
            .collect();
        let total = matching.len() as i64;
        Ok(Paginated::new(page_slice(&matching, page), page, total))
    }
}
