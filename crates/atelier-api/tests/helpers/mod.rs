//! Test helpers: build AppState and router over in-memory doubles.
//!
//! Run from workspace root: `cargo test -p atelier-api`. No database or
//! Docker is needed; repositories and storage live in memory.

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use std::sync::Arc;

use atelier_api::setup::routes::setup_routes;
use atelier_api::state::AppState;
use atelier_core::{BaseConfig, Config, GalleryConfig, StorageBackend};
use atelier_db::InMemoryGalleryStore;
use atelier_storage::InMemoryStorage;
use axum_test::TestServer;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-that-is-at-least-32-characters";
pub const TEST_MEDIA_BASE_URL: &str = "http://localhost:4000/media";

/// Test application: server plus handles on the in-memory backends.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub store: Arc<InMemoryGalleryStore>,
    pub storage: Arc<InMemoryStorage>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config() -> Config {
    Config(Box::new(GalleryConfig {
        base: BaseConfig {
            server_port: 4000,
            cors_origins: vec!["http://localhost:3000".to_string()],
            db_max_connections: 1,
            db_timeout_seconds: 5,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_expiry_hours: 1,
            environment: "test".to_string(),
        },
        database_url: "postgresql://unused@localhost/unused".to_string(),
        storage_backend: Some(StorageBackend::Local),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: None,
        local_storage_base_url: Some(TEST_MEDIA_BASE_URL.to_string()),
        min_upload_size_bytes: 100,
        max_upload_size_bytes: 5 * 1024 * 1024,
        image_decode_timeout_secs: 10,
        min_image_dimension: 10,
        strip_exif: true,
        exif_strip_fail_open: true,
        sanitize_min_retained_ratio: 0.5,
        view_cooldown_secs: 1800,
    }))
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with_config(test_config())
}

pub fn setup_test_app_with_config(config: Config) -> TestApp {
    let store = Arc::new(InMemoryGalleryStore::new());
    let storage = Arc::new(InMemoryStorage::with_base_url(TEST_MEDIA_BASE_URL));

    let state = Arc::new(AppState::new(
        config.clone(),
        store.clone(),
        store.clone(),
        storage.clone(),
    ));

    let router = setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        state,
        store,
        storage,
    }
}
