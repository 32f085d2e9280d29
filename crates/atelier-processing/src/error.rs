/// Reasons an upload is flagged by the image security pipeline.
///
/// The `Display` text of each variant is the warning shown to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecurityError {
    #[error("File is too small ({size} bytes, minimum {min} bytes)")]
    FileTooSmall { size: usize, min: usize },

    #[error("File is too large ({size} bytes, maximum {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("File has no extension")]
    MissingExtension,

    #[error("Executable or script files are not allowed (.{0})")]
    ExecutableExtension(String),

    #[error("Unsupported file type (.{0}); allowed: jpg, jpeg, png, gif, webp")]
    UnsupportedExtension(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Content type {content_type} does not match file extension .{extension} (expected {expected})")]
    ContentTypeMismatch {
        content_type: String,
        extension: String,
        expected: &'static str,
    },

    #[error("Multiple file extensions detected")]
    MultipleExtensions,

    #[error("Image could not be decoded: {0}")]
    Undecodable(String),

    #[error("File content does not match its declared type {0}")]
    ContentSniffMismatch(String),

    #[error("Image dimensions {width}x{height} are below the minimum of {min}x{min}")]
    DimensionsTooSmall { width: u32, height: u32, min: u32 },

    #[error("Image validation timed out")]
    DecodeTimeout,

    #[error("Image metadata could not be removed: {0}")]
    ExifStripFailed(String),
}

impl SecurityError {
    /// Whether this finding rejects the upload on its own.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, SecurityError::MultipleExtensions)
    }
}
