//! Atelier Processing Library
//!
//! Security processing for uploaded artwork images. Files go through three
//! stages in order:
//!
//! 1. [`validator`]: size limits, extension and declared MIME type checks.
//! 2. [`content`]: full decode on the blocking pool with a timeout, sniffed
//!    format check and minimum dimensions.
//! 3. EXIF removal for JPEGs, with a configurable fallback when it fails.
//!
//! [`pipeline::process_image_securely`] runs all of them.

pub mod content;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod validator;

pub use error::SecurityError;
pub use pipeline::{process_image_securely, ImageSecurityProcessor};
pub use policy::SecurityPolicy;
pub use validator::{assess_image_security, ImageValidator};
