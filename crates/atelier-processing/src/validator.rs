//! Pre-decode checks on an uploaded image: size, name and declared type.

use atelier_core::models::{SecurityAssessment, UploadedFile};
use atelier_core::validation::file_extension;

use crate::error::SecurityError;
use crate::policy::SecurityPolicy;

/// Extensions that are never accepted, whatever the declared type.
const EXECUTABLE_EXTENSIONS: &[&str] = &[
    "exe", "bat", "cmd", "com", "pif", "scr", "vbs", "js", "jar", "msi", "dll", "php", "phtml",
    "asp", "aspx", "jsp", "sh", "ps1", "py", "pl", "rb", "cgi", "html", "htm", "svg",
];

/// Expected MIME type for each accepted image extension.
pub fn expected_content_type(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// `image/JPEG; charset=binary` -> `image/jpeg`
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Image upload validator
///
/// Collects every finding instead of stopping at the first one, so the
/// client sees all the reasons an upload was refused.
pub struct ImageValidator<'a> {
    policy: &'a SecurityPolicy,
}

impl<'a> ImageValidator<'a> {
    pub fn new(policy: &'a SecurityPolicy) -> Self {
        Self { policy }
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), SecurityError> {
        if size < self.policy.min_file_size {
            return Err(SecurityError::FileTooSmall {
                size,
                min: self.policy.min_file_size,
            });
        }

        if size > self.policy.max_file_size {
            return Err(SecurityError::FileTooLarge {
                size,
                max: self.policy.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate the final extension and return it, lowercased.
    pub fn validate_extension(&self, filename: &str) -> Result<String, SecurityError> {
        let extension = file_extension(filename).ok_or(SecurityError::MissingExtension)?;

        if EXECUTABLE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(SecurityError::ExecutableExtension(extension));
        }

        if expected_content_type(&extension).is_none() {
            return Err(SecurityError::UnsupportedExtension(extension));
        }

        Ok(extension)
    }

    /// Validate that the declared Content-Type is the one expected for the extension.
    pub fn validate_extension_content_type_match(
        &self,
        extension: &str,
        content_type: &str,
    ) -> Result<(), SecurityError> {
        let normalized = normalize_content_type(content_type);

        let Some(expected) = expected_content_type(extension) else {
            return Err(SecurityError::UnsupportedExtension(extension.to_string()));
        };

        if !normalized.starts_with("image/") {
            return Err(SecurityError::UnsupportedContentType(content_type.to_string()));
        }

        if normalized != expected {
            return Err(SecurityError::ContentTypeMismatch {
                content_type: normalized,
                extension: extension.to_string(),
                expected,
            });
        }

        Ok(())
    }

    /// More than one dot-separated suffix after the stem, e.g. `shell.php.jpg`.
    pub fn has_multiple_extensions(&self, filename: &str) -> bool {
        let name = filename.trim().trim_start_matches('.');
        name.split('.').filter(|part| !part.is_empty()).count() > 2
    }

    pub fn assess(&self, file: &UploadedFile) -> SecurityAssessment {
        let mut assessment = SecurityAssessment::default();
        let mut record = |err: SecurityError| {
            if err.is_blocking() {
                assessment.block(err.to_string());
            } else {
                assessment.warn(err.to_string());
            }
        };

        if let Err(err) = self.validate_file_size(file.size()) {
            record(err);
        }

        match self.validate_extension(&file.name) {
            Ok(extension) => {
                if let Err(err) =
                    self.validate_extension_content_type_match(&extension, &file.content_type)
                {
                    record(err);
                }
            }
            Err(err) => record(err),
        }

        if self.has_multiple_extensions(&file.name) {
            record(SecurityError::MultipleExtensions);
        }

        assessment.finish()
    }
}

/// Run the pre-decode checks on `file`.
///
/// `blocked` is set by size limits, missing/executable/unsupported extensions
/// and MIME/extension disagreement. Multiple extensions only add a warning.
pub fn assess_image_security(file: &UploadedFile, policy: &SecurityPolicy) -> SecurityAssessment {
    ImageValidator::new(policy).assess(file)
}
