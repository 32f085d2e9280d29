//! The image security pipeline: assess, decode, strip metadata.

use atelier_core::models::{ImageProcessingResult, UploadedFile};
use bytes::Bytes;

use crate::content::{decode_dimensions, strip_jpeg_exif};
use crate::error::SecurityError;
use crate::policy::SecurityPolicy;
use crate::validator::{assess_image_security, normalize_content_type};

const EXIF_FALLBACK_WARNING: &str = "Image metadata could not be removed; the original file was kept";

/// Runs uploads through the security checks in order, stopping at the first
/// blocking stage.
#[derive(Debug, Clone, Default)]
pub struct ImageSecurityProcessor {
    policy: SecurityPolicy,
}

impl ImageSecurityProcessor {
    pub fn new(policy: SecurityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SecurityPolicy {
        &self.policy
    }

    /// Assess, then decode, then strip EXIF (JPEG only).
    ///
    /// Every warning raised along the way is carried in the result, on
    /// success as well as on rejection.
    #[tracing::instrument(skip(self, file), fields(file.name = %file.name, file.size = file.size()))]
    pub async fn process(&self, file: UploadedFile) -> ImageProcessingResult {
        let assessment = assess_image_security(&file, &self.policy);
        if assessment.blocked {
            tracing::warn!(
                warnings = ?assessment.warnings,
                content_type = %file.content_type,
                "Upload blocked by security assessment"
            );
            return ImageProcessingResult::rejected("Security check failed", assessment.warnings);
        }
        let mut warnings = assessment.warnings;

        // Parameters on the declared type are dropped; the bare type matched the extension.
        let mut file = file;
        file.content_type = normalize_content_type(&file.content_type);

        let dimensions = match self.validate_content(&file).await {
            Ok(dimensions) => dimensions,
            Err(err) => {
                tracing::warn!(error = %err, "Upload rejected by content validation");
                warnings.push(err.to_string());
                return ImageProcessingResult::rejected(err.to_string(), warnings);
            }
        };

        let file = if self.policy.strip_exif && is_jpeg(&file) {
            let outcome = strip_exif_blocking(file.data.clone()).await;
            match apply_exif_outcome(file, outcome, self.policy.exif_fail_open, &mut warnings) {
                Ok(file) => file,
                Err(err) => {
                    warnings.push(err.to_string());
                    return ImageProcessingResult::rejected(err.to_string(), warnings);
                }
            }
        } else {
            file
        };

        tracing::debug!(
            width = dimensions.0,
            height = dimensions.1,
            warnings = warnings.len(),
            "Image passed security processing"
        );
        ImageProcessingResult::accepted(file, dimensions, warnings)
    }

    /// Decode on the blocking pool, bounded by the policy timeout, and check
    /// the minimum dimensions.
    async fn validate_content(&self, file: &UploadedFile) -> Result<(u32, u32), SecurityError> {
        let data = file.data.clone();
        let content_type = normalize_content_type(&file.content_type);
        let max_dimension = self.policy.max_dimension;

        let task = tokio::task::spawn_blocking(move || {
            decode_dimensions(&data, &content_type, max_dimension)
        });

        let (width, height) = match tokio::time::timeout(self.policy.decode_timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_err)) => {
                return Err(SecurityError::Undecodable(format!(
                    "decoder task failed: {}",
                    join_err
                )))
            }
            Err(_) => return Err(SecurityError::DecodeTimeout),
        };

        let min = self.policy.min_dimension;
        if width < min || height < min {
            return Err(SecurityError::DimensionsTooSmall { width, height, min });
        }

        Ok((width, height))
    }
}

/// Run the whole pipeline with `policy`.
pub async fn process_image_securely(
    file: UploadedFile,
    policy: &SecurityPolicy,
) -> ImageProcessingResult {
    ImageSecurityProcessor::new(policy.clone()).process(file).await
}

fn is_jpeg(file: &UploadedFile) -> bool {
    normalize_content_type(&file.content_type) == "image/jpeg"
}

async fn strip_exif_blocking(data: Bytes) -> Result<Option<Bytes>, SecurityError> {
    match tokio::task::spawn_blocking(move || strip_jpeg_exif(&data)).await {
        Ok(result) => result,
        Err(join_err) => Err(SecurityError::ExifStripFailed(join_err.to_string())),
    }
}

/// Turn the EXIF removal outcome into the file to keep.
///
/// On failure the original file is kept with a warning when `fail_open` is
/// set; otherwise the failure rejects the upload.
fn apply_exif_outcome(
    file: UploadedFile,
    outcome: Result<Option<Bytes>, SecurityError>,
    fail_open: bool,
    warnings: &mut Vec<String>,
) -> Result<UploadedFile, SecurityError> {
    match outcome {
        Ok(Some(stripped)) => {
            tracing::debug!(
                original_size = file.size(),
                stripped_size = stripped.len(),
                "Removed EXIF metadata"
            );
            Ok(file.with_data(stripped))
        }
        Ok(None) => Ok(file),
        Err(err) if fail_open => {
            tracing::warn!(error = %err, file = %file.name, "EXIF removal failed, keeping original file");
            warnings.push(EXIF_FALLBACK_WARNING.to_string());
            Ok(file)
        }
        Err(err) => Err(err),
    }
}
