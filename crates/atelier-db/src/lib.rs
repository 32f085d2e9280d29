//! Atelier Database Library
//!
//! Repository traits and their PostgreSQL implementations for artworks and
//! engagement (likes, views, comments), plus an in-memory implementation
//! for tests and local development.

pub mod db;

pub use db::{
    ArtworkRepository, ArtworkStore, EngagementRepository, EngagementStore, InMemoryGalleryStore,
};
