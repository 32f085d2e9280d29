//! Shared application state.

use std::sync::Arc;

use atelier_core::{Config, InMemoryViewStore, ViewTracker};
use atelier_db::{ArtworkStore, EngagementStore};
use atelier_processing::SecurityPolicy;
use atelier_storage::Storage;
use sqlx::PgPool;

use crate::auth::JwtService;

/// State handed to every handler as `State<Arc<AppState>>`.
///
/// Repositories and storage are trait objects so the HTTP layer can be
/// exercised against in-memory doubles.
pub struct AppState {
    pub config: Config,
    pub artworks: Arc<dyn ArtworkStore>,
    pub engagement: Arc<dyn EngagementStore>,
    pub storage: Arc<dyn Storage>,
    pub security_policy: SecurityPolicy,
    /// Share of an input's characters sanitization must keep for it to be accepted
    pub min_retained_ratio: f64,
    pub view_tracker: Arc<ViewTracker<InMemoryViewStore>>,
    pub jwt: JwtService,
    /// Present when backed by PostgreSQL; used by the health check.
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        config: Config,
        artworks: Arc<dyn ArtworkStore>,
        engagement: Arc<dyn EngagementStore>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let cooldown = std::time::Duration::from_secs(config.view_cooldown_secs());
        Self {
            security_policy: SecurityPolicy::from_config(&config),
            min_retained_ratio: config.sanitize_min_retained_ratio(),
            view_tracker: Arc::new(ViewTracker::in_memory(cooldown)),
            jwt: JwtService::new(config.jwt_secret(), config.jwt_expiry_hours()),
            config,
            artworks,
            engagement,
            storage,
            pool: None,
        }
    }

    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }
}
