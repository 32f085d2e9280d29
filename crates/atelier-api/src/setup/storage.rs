//! Storage setup

use std::sync::Arc;

use anyhow::Result;
use atelier_core::{Config, StorageBackend};
use atelier_storage::{create_storage, Storage};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");
    let storage = create_storage(config).await?;
    tracing::info!(backend = ?storage.backend_type(), "Storage initialized");
    Ok(storage)
}

/// Origins the browser loads artwork images from, for the CSP `img-src`.
/// Local storage is served by this API and needs nothing extra.
pub fn media_origins(config: &Config) -> Vec<String> {
    match config.storage_backend() {
        Some(StorageBackend::S3) => match (config.s3_endpoint(), config.s3_bucket()) {
            (Some(endpoint), _) => vec![endpoint.trim_end_matches('/').to_string()],
            (None, Some(bucket)) => {
                let region = config.s3_region().unwrap_or("us-east-1");
                vec![format!("https://{}.s3.{}.amazonaws.com", bucket, region)]
            }
            (None, None) => Vec::new(),
        },
        _ => Vec::new(),
    }
}
