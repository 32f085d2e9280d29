//! Atelier API Library
//!
//! HTTP handlers, authentication, audit logging and application setup for
//! the gallery backend.

mod api_doc;
mod handlers;
mod middleware;
mod services;
mod utils;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
