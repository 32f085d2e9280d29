//! Validation and sanitization of user input

pub mod filename;
pub mod sanitize;

pub use filename::{file_extension, sanitize_filename, MAX_FILENAME_LENGTH};
pub use sanitize::{
    contains_dangerous_content, is_valid_sanitized_input, is_valid_sanitized_input_with_ratio,
    matched_dangerous_patterns, sanitize, sanitize_artist_name, sanitize_artwork_description,
    sanitize_artwork_title, sanitize_comment, SanitizeOptions, DEFAULT_MIN_RETAINED_RATIO,
};
