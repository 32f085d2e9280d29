//! Atelier Storage Library
//!
//! Blob storage for uploaded artwork images: the [`Storage`] trait plus S3,
//! local filesystem and in-memory implementations.
//!
//! # Storage key format
//!
//! All backends use `artworks/{owner_id}/{filename}`. Keys must not contain
//! `..` segments or a leading `/`; generation and validation live in `keys`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use atelier_core::StorageBackend;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::InMemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
