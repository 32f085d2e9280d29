//! Atelier Core Library
//!
//! Domain models, error types, configuration, input sanitization and the
//! small stateful helpers (pagination, view tracking) shared by every Atelier crate.

pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod storage_types;
pub mod validation;
pub mod view_tracker;

// Re-export commonly used types
pub use config::{BaseConfig, Config, GalleryConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use pagination::{generate_page_numbers, PageItem, PageRequest, Paginated};
pub use storage_types::StorageBackend;
pub use view_tracker::{InMemoryViewStore, ViewStore, ViewTracker, DEFAULT_VIEW_COOLDOWN};
// Storage, StorageError and StorageResult live in atelier-storage
