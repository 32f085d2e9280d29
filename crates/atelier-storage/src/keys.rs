//! Shared key generation for storage backends.

use uuid::Uuid;

/// Top-level prefix for artwork images.
pub const ARTWORK_PREFIX: &str = "artworks";

/// Storage key for an owner's file: `artworks/{owner_id}/{filename}`.
pub fn generate_storage_key(owner_id: Uuid, filename: &str) -> String {
    format!("{}/{}/{}", ARTWORK_PREFIX, owner_id, filename)
}

/// Keys must be relative, free of `..` segments and of backslashes.
pub fn validate_storage_key(storage_key: &str) -> bool {
    !storage_key.is_empty()
        && !storage_key.starts_with('/')
        && !storage_key.contains('\\')
        && !storage_key.split('/').any(|segment| segment == ".." || segment.is_empty())
}
