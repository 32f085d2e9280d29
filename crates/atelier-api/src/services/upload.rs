//! Artwork upload orchestration
//!
//! sanitize → validate → category → image security → store → persist, with
//! the stored blob removed again when the database insert fails. Each stage
//! either passes its output to the next or ends the request with one error;
//! nothing is retried.

use std::sync::Arc;

use atelier_core::models::{
    ArtworkCategory, InvalidCategory, NewArtwork, ProcessedImage, UploadArtworkResponse,
};
use atelier_core::validation::{
    file_extension, is_valid_sanitized_input_with_ratio, sanitize_artwork_description,
    sanitize_artwork_title, sanitize_filename,
};
use atelier_core::AppError;
use atelier_processing::process_image_securely;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::middleware::audit;
use crate::state::AppState;
use crate::utils::multipart::ArtworkUploadForm;

/// Title and description after sanitization, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedText {
    pub title: String,
    pub description: String,
}

pub struct ArtworkUploadService {
    state: Arc<AppState>,
}

impl ArtworkUploadService {
    pub fn new(state: &Arc<AppState>) -> Self {
        Self {
            state: state.clone(),
        }
    }

    #[tracing::instrument(
        skip(self, form, client_ip),
        fields(user_id = %user.user_id, filename = %form.image.name, size = form.image.size())
    )]
    pub async fn upload(
        &self,
        user: AuthUser,
        form: ArtworkUploadForm,
        client_ip: Option<String>,
    ) -> Result<UploadArtworkResponse, AppError> {
        let text = self.sanitize_text(user.user_id, &form, client_ip.clone())?;

        let category: ArtworkCategory = form
            .category
            .parse()
            .map_err(|e: InvalidCategory| AppError::InvalidInput(e.to_string()))?;

        let original_name = form.image.name.clone();
        let processed = process_image_securely(form.image, &self.state.security_policy)
            .await
            .into_result()
            .map_err(|reason| {
                tracing::warn!(reason = %reason, "Upload rejected by image security checks");
                audit::log_upload_blocked(user.user_id, &original_name, &reason, client_ip.clone());
                AppError::SecurityBlocked(reason)
            })?;

        let artwork_id = Uuid::new_v4();
        let safe_filename = sanitize_filename(&processed.file.name);
        let stored_filename = match file_extension(&safe_filename) {
            Some(ext) => format!("{}.{}", artwork_id, ext),
            None => artwork_id.to_string(),
        };
        let file_size = processed.file.size() as i64;
        let content_type = processed.file.content_type.clone();

        let (storage_key, image_url) = self
            .state
            .storage
            .upload(
                user.user_id,
                &stored_filename,
                &content_type,
                processed.file.data.clone(),
            )
            .await
            .map_err(|e| {
                tracing::error!(error = %e, artwork_id = %artwork_id, "Failed to upload to storage");
                AppError::Storage(format!("Failed to upload image: {}", e))
            })?;

        let ProcessedImage {
            width,
            height,
            warnings,
            ..
        } = processed;

        let new_artwork = NewArtwork {
            id: artwork_id,
            user_id: user.user_id,
            title: text.title,
            description: text.description,
            category,
            image_url,
            storage_key: storage_key.clone(),
            original_filename: safe_filename,
            content_type,
            file_size,
            width: width as i32,
            height: height as i32,
        };

        let artwork = match self.state.artworks.insert(new_artwork).await {
            Ok(artwork) => artwork,
            Err(e) => {
                tracing::error!(error = %e, artwork_id = %artwork_id, "Failed to save artwork");
                self.cleanup_stored_blob(&storage_key).await;
                return Err(e);
            }
        };

        audit::log_artwork_uploaded(
            user.user_id,
            artwork.id,
            &original_name,
            &stored_filename,
            file_size,
            client_ip,
        );
        tracing::info!(artwork_id = %artwork.id, "Artwork uploaded");

        Ok(UploadArtworkResponse {
            success: true,
            artwork,
            warnings: (!warnings.is_empty()).then_some(warnings),
        })
    }

    /// Sanitize title and description, rejecting input that lost too much.
    /// An empty description is allowed.
    fn sanitize_text(
        &self,
        user_id: Uuid,
        form: &ArtworkUploadForm,
        client_ip: Option<String>,
    ) -> Result<SanitizedText, AppError> {
        let ratio = self.state.min_retained_ratio;

        let title = sanitize_artwork_title(&form.title);
        audit::log_sanitization(Some(user_id), "title", &form.title, &title, client_ip.clone());
        if !is_valid_sanitized_input_with_ratio(form.title.trim(), &title, ratio) {
            return Err(AppError::InvalidInput(
                "Title contains invalid or disallowed content".to_string(),
            ));
        }

        let description = sanitize_artwork_description(&form.description);
        audit::log_sanitization(
            Some(user_id),
            "description",
            &form.description,
            &description,
            client_ip,
        );
        if !form.description.trim().is_empty()
            && !is_valid_sanitized_input_with_ratio(form.description.trim(), &description, ratio)
        {
            return Err(AppError::InvalidInput(
                "Description contains invalid or disallowed content".to_string(),
            ));
        }

        Ok(SanitizedText { title, description })
    }

    /// Compensating delete after a failed insert. Failures are logged only.
    async fn cleanup_stored_blob(&self, storage_key: &str) {
        match self.state.storage.delete(storage_key).await {
            Ok(()) => {
                tracing::info!(storage_key = %storage_key, "Removed stored image after DB error");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    storage_key = %storage_key,
                    "Failed to cleanup storage file after DB error"
                );
            }
        }
    }
}
