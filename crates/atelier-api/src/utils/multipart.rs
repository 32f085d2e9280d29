//! Multipart parsing for artwork uploads

use atelier_core::models::UploadedFile;
use atelier_core::validation::sanitize::DESCRIPTION_MAX_LENGTH;
use atelier_core::AppError;
use axum::extract::multipart::Field;
use axum::extract::Multipart;

pub const IMAGE_FIELD: &str = "imageFile";

/// Raw size cap for text fields, checked before anything is sanitized.
pub const MAX_TEXT_FIELD_BYTES: usize = DESCRIPTION_MAX_LENGTH * 16;

/// Raw (unsanitized) artwork upload form.
#[derive(Debug, Clone)]
pub struct ArtworkUploadForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: UploadedFile,
}

/// Read `title`, `description`, `category` and `imageFile` from the form.
/// Unknown fields are ignored; a second image field is rejected.
pub async fn extract_artwork_form(mut multipart: Multipart) -> Result<ArtworkUploadForm, AppError> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut category: Option<String> = None;
    let mut image: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            IMAGE_FIELD => {
                if image.is_some() {
                    return Err(AppError::InvalidInput(
                        "Only one image file may be uploaded per artwork".to_string(),
                    ));
                }
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "untitled".to_string());
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;
                image = Some(UploadedFile::new(filename, content_type, data));
            }
            "title" | "description" | "category" => {
                let value = read_text_field(field, &field_name).await?;
                match field_name.as_str() {
                    "title" => title = Some(value),
                    "description" => description = Some(value),
                    _ => category = Some(value),
                }
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unexpected multipart field");
            }
        }
    }

    let title = title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("Title is required".to_string()))?;
    let category = category
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Category is required".to_string()))?;
    let image =
        image.ok_or_else(|| AppError::InvalidInput("Image file is required".to_string()))?;

    Ok(ArtworkUploadForm {
        title,
        description: description.unwrap_or_default(),
        category,
        image,
    })
}

/// Read a text field chunk by chunk, refusing values over [`MAX_TEXT_FIELD_BYTES`].
async fn read_text_field(mut field: Field<'_>, field_name: &str) -> Result<String, AppError> {
    let mut buffer: Vec<u8> = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| {
        AppError::InvalidInput(format!("Failed to read field '{}': {}", field_name, e))
    })? {
        if buffer.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(AppError::InvalidInput(format!(
                "Field '{}' exceeds {} bytes",
                field_name, MAX_TEXT_FIELD_BYTES
            )));
        }
        buffer.extend_from_slice(&chunk);
    }

    String::from_utf8(buffer).map_err(|_| {
        AppError::InvalidInput(format!("Field '{}' is not valid UTF-8", field_name))
    })
}
