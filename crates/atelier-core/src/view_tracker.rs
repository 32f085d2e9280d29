//! View de-duplication.
//!
//! A [`ViewTracker`] decides whether a visit should count as a new view of an
//! artwork. The last counted view per (artwork, viewer) pair is kept in a
//! [`ViewStore`]; [`InMemoryViewStore`] keeps it in process memory.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

pub const DEFAULT_VIEW_COOLDOWN: Duration = Duration::from_secs(30 * 60);

/// Entries older than this many cooldown windows are pruned from the in-memory store.
const PRUNE_AFTER_WINDOWS: u32 = 4;
const PRUNE_EVERY_N_WRITES: u64 = 1024;

/// Key-value persistence for last-view timestamps.
#[async_trait]
pub trait ViewStore: Send + Sync {
    async fn get_last_view(&self, artwork_id: Uuid, viewer_key: &str) -> Option<DateTime<Utc>>;

    async fn put_last_view(&self, artwork_id: Uuid, viewer_key: &str, at: DateTime<Utc>);
}

/// Process-local [`ViewStore`].
#[derive(Default)]
pub struct InMemoryViewStore {
    inner: Mutex<InMemoryState>,
    retention: Option<Duration>,
}

#[derive(Default)]
struct InMemoryState {
    entries: HashMap<(Uuid, String), DateTime<Utc>>,
    writes: u64,
}

impl InMemoryViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that drops entries older than `retention` as it grows.
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            inner: Mutex::new(InMemoryState::default()),
            retention: Some(retention),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ViewStore for InMemoryViewStore {
    async fn get_last_view(&self, artwork_id: Uuid, viewer_key: &str) -> Option<DateTime<Utc>> {
        self.inner
            .lock()
            .await
            .entries
            .get(&(artwork_id, viewer_key.to_string()))
            .copied()
    }

    async fn put_last_view(&self, artwork_id: Uuid, viewer_key: &str, at: DateTime<Utc>) {
        let mut state = self.inner.lock().await;
        state.entries.insert((artwork_id, viewer_key.to_string()), at);
        state.writes += 1;

        if let Some(retention) = self.retention {
            if state.writes % PRUNE_EVERY_N_WRITES == 0 {
                if let Ok(retention) = chrono::Duration::from_std(retention) {
                    let cutoff = at - retention;
                    state.entries.retain(|_, seen| *seen >= cutoff);
                }
            }
        }
    }
}

/// Decides whether a view is counted.
pub struct ViewTracker<S: ViewStore> {
    store: S,
    cooldown: Duration,
}

impl<S: ViewStore> ViewTracker<S> {
    pub fn new(store: S, cooldown: Duration) -> Self {
        Self { store, cooldown }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Whether a visit at `now` would count: no counted view by this viewer
    /// exists within the cooldown window. Nothing is stored.
    pub async fn should_count_at(
        &self,
        artwork_id: Uuid,
        viewer_key: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(last) = self.store.get_last_view(artwork_id, viewer_key).await else {
            return true;
        };
        let cooldown = chrono::Duration::from_std(self.cooldown)
            .unwrap_or_else(|_| chrono::Duration::days(36_500));
        now.signed_duration_since(last) >= cooldown
    }

    pub async fn should_count(&self, artwork_id: Uuid, viewer_key: &str) -> bool {
        self.should_count_at(artwork_id, viewer_key, Utc::now()).await
    }

    /// Start a new cooldown window for this viewer. Call once the view is persisted.
    pub async fn mark_counted_at(&self, artwork_id: Uuid, viewer_key: &str, now: DateTime<Utc>) {
        self.store.put_last_view(artwork_id, viewer_key, now).await;
    }

    pub async fn mark_counted(&self, artwork_id: Uuid, viewer_key: &str) {
        self.mark_counted_at(artwork_id, viewer_key, Utc::now()).await;
    }

    /// Check and mark in one step, for callers with nothing to persist in between.
    pub async fn try_count_at(
        &self,
        artwork_id: Uuid,
        viewer_key: &str,
        now: DateTime<Utc>,
    ) -> bool {
        if !self.should_count_at(artwork_id, viewer_key, now).await {
            return false;
        }
        self.mark_counted_at(artwork_id, viewer_key, now).await;
        true
    }
}

impl ViewTracker<InMemoryViewStore> {
    /// In-memory tracker that prunes entries once they are well past the cooldown.
    pub fn in_memory(cooldown: Duration) -> Self {
        Self::new(
            InMemoryViewStore::with_retention(cooldown * PRUNE_AFTER_WINDOWS),
            cooldown,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_view_counts() {
        let tracker = ViewTracker::in_memory(DEFAULT_VIEW_COOLDOWN);
        assert!(tracker.try_count_at(Uuid::new_v4(), "user:1", Utc::now()).await);
    }

    #[tokio::test]
    async fn test_repeat_within_cooldown_ignored() {
        let tracker = ViewTracker::new(InMemoryViewStore::new(), Duration::from_secs(60));
        let artwork = Uuid::new_v4();
        let start = Utc::now();

        assert!(tracker.try_count_at(artwork, "ip:10.0.0.1", start).await);
        assert!(
            !tracker
                .try_count_at(artwork, "ip:10.0.0.1", start + chrono::Duration::seconds(59))
                .await
        );
        assert!(
            tracker
                .try_count_at(artwork, "ip:10.0.0.1", start + chrono::Duration::seconds(60))
                .await
        );
    }

    #[tokio::test]
    async fn test_viewers_and_artworks_tracked_independently() {
        let tracker = ViewTracker::new(InMemoryViewStore::new(), DEFAULT_VIEW_COOLDOWN);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert!(tracker.try_count_at(a, "user:1", Utc::now()).await);
        assert!(tracker.try_count_at(a, "user:2", Utc::now()).await);
        assert!(tracker.try_count_at(b, "user:1", Utc::now()).await);
        assert!(!tracker.try_count_at(a, "user:1", Utc::now()).await);
    }

    #[tokio::test]
    async fn test_ignored_view_does_not_extend_window() {
        let store = InMemoryViewStore::new();
        let artwork = Uuid::new_v4();
        let start = Utc::now();
        let tracker = ViewTracker::new(store, Duration::from_secs(60));

        assert!(tracker.try_count_at(artwork, "v", start).await);
        assert!(
            !tracker
                .try_count_at(artwork, "v", start + chrono::Duration::seconds(30))
                .await
        );
        assert_eq!(
            tracker.store.get_last_view(artwork, "v").await,
            Some(start)
        );
    }

    #[tokio::test]
    async fn test_check_alone_does_not_start_window() {
        let tracker = ViewTracker::new(InMemoryViewStore::new(), Duration::from_secs(60));
        let artwork = Uuid::new_v4();
        let start = Utc::now();

        assert!(tracker.should_count_at(artwork, "user:1", start).await);
        assert!(tracker.should_count_at(artwork, "user:1", start).await);

        tracker.mark_counted_at(artwork, "user:1", start).await;
        assert!(
            !tracker
                .should_count_at(artwork, "user:1", start + chrono::Duration::seconds(1))
                .await
        );
    }
}
