//! Data models for the application

mod artwork;
mod comment;
mod upload;

pub use artwork::*;
pub use comment::*;
pub use upload::*;
