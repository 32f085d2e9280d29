//! Database repositories
//!
//! Each repository is a trait (`*Store`) with a PostgreSQL implementation
//! (`*Repository`). Handlers only see the traits, so the in-memory store can
//! stand in for Postgres in tests.

pub mod artwork;
pub mod engagement;
pub mod memory;

pub use artwork::{ArtworkRepository, ArtworkStore};
pub use engagement::{EngagementRepository, EngagementStore};
pub use memory::InMemoryGalleryStore;

/// Foreign-key violations mean the referenced artwork vanished mid-request.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
}
