use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// An uploaded file held in memory, as received from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    /// Declared MIME type (from the multipart part, not sniffed)
    pub content_type: String,
    pub data: Bytes,
    pub last_modified: DateTime<Utc>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
            last_modified: Utc::now(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Same name, type and modification time with different content.
    pub fn with_data(&self, data: Bytes) -> Self {
        Self {
            name: self.name.clone(),
            content_type: self.content_type.clone(),
            data,
            last_modified: self.last_modified,
        }
    }
}

/// Outcome of the pre-decode security checks on an upload.
#[derive(Debug, Clone, Default, Serialize, ToSchema, PartialEq, Eq)]
pub struct SecurityAssessment {
    /// True only when nothing was blocked and no warning was raised
    pub safe: bool,
    pub warnings: Vec<String>,
    pub blocked: bool,
}

impl SecurityAssessment {
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn block(&mut self, message: impl Into<String>) {
        self.blocked = true;
        self.warnings.push(message.into());
    }

    pub fn finish(mut self) -> Self {
        self.safe = !self.blocked && self.warnings.is_empty();
        self
    }
}

/// Result of the full image security pipeline.
#[derive(Debug, Clone)]
pub struct ImageProcessingResult {
    pub success: bool,
    pub file: Option<UploadedFile>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
    /// Decoded dimensions, present whenever decoding succeeded
    pub dimensions: Option<(u32, u32)>,
}

/// A file that made it through the pipeline.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub file: UploadedFile,
    pub width: u32,
    pub height: u32,
    pub warnings: Vec<String>,
}

impl ImageProcessingResult {
    pub fn accepted(file: UploadedFile, dimensions: (u32, u32), warnings: Vec<String>) -> Self {
        Self {
            success: true,
            file: Some(file),
            error: None,
            warnings,
            dimensions: Some(dimensions),
        }
    }

    pub fn rejected(error: impl Into<String>, warnings: Vec<String>) -> Self {
        Self {
            success: false,
            file: None,
            error: Some(error.into()),
            warnings,
            dimensions: None,
        }
    }

    /// Collapse into a `Result`. The error is the message shown to the client:
    /// the joined warnings when there are any, the error text otherwise.
    pub fn into_result(self) -> Result<ProcessedImage, String> {
        match (self.success, self.file, self.dimensions) {
            (true, Some(file), Some((width, height))) => Ok(ProcessedImage {
                file,
                width,
                height,
                warnings: self.warnings,
            }),
            _ => {
                if self.warnings.is_empty() {
                    Err(self
                        .error
                        .unwrap_or_else(|| "Image processing failed".to_string()))
                } else {
                    Err(self.warnings.join(", "))
                }
            }
        }
    }
}
