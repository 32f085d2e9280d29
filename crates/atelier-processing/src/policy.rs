use std::time::Duration;

use atelier_core::Config;

pub const DEFAULT_MIN_FILE_SIZE: usize = 100;
pub const DEFAULT_MAX_FILE_SIZE: usize = 50 * 1024 * 1024;
pub const DEFAULT_DECODE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MIN_DIMENSION: u32 = 10;
pub const DEFAULT_MAX_DIMENSION: u32 = 16_384;

/// Thresholds and switches for the image security pipeline.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    pub min_file_size: usize,
    pub max_file_size: usize,
    pub decode_timeout: Duration,
    pub min_dimension: u32,
    pub max_dimension: u32,
    pub strip_exif: bool,
    /// Keep the original file (with a warning) when EXIF removal fails.
    pub exif_fail_open: bool,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            min_file_size: DEFAULT_MIN_FILE_SIZE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            decode_timeout: DEFAULT_DECODE_TIMEOUT,
            min_dimension: DEFAULT_MIN_DIMENSION,
            max_dimension: DEFAULT_MAX_DIMENSION,
            strip_exif: true,
            exif_fail_open: true,
        }
    }
}

impl SecurityPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_file_size: config.min_upload_size_bytes(),
            max_file_size: config.max_upload_size_bytes(),
            decode_timeout: Duration::from_secs(config.image_decode_timeout_secs()),
            min_dimension: config.min_image_dimension(),
            strip_exif: config.strip_exif(),
            exif_fail_open: config.exif_strip_fail_open(),
            ..Self::default()
        }
    }
}
