//! Artwork deletion: the row goes first, then the stored image.

use std::sync::Arc;

use atelier_core::AppError;
use atelier_db::ArtworkStore;
use atelier_storage::Storage;
use uuid::Uuid;

use crate::auth::AuthUser;

pub struct ArtworkLifecycleService;

impl ArtworkLifecycleService {
    /// Delete an artwork the caller owns (or any artwork, for admins).
    ///
    /// Removing the blob is best-effort: a failure leaves an orphaned object
    /// behind and is logged, the request still succeeds.
    pub async fn delete_artwork(
        artworks: &Arc<dyn ArtworkStore>,
        storage: &Arc<dyn Storage>,
        user: AuthUser,
        artwork_id: Uuid,
    ) -> Result<(), AppError> {
        let artwork = artworks
            .get(artwork_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Artwork {} not found", artwork_id)))?;

        if !user.can_manage(artwork.user_id) {
            return Err(AppError::Forbidden(
                "You can only delete your own artworks".to_string(),
            ));
        }

        if !artworks.delete(artwork_id).await? {
            return Err(AppError::NotFound(format!(
                "Artwork {} not found",
                artwork_id
            )));
        }

        if let Err(e) = storage.delete(&artwork.storage_key).await {
            tracing::error!(
                error = %e,
                artwork_id = %artwork_id,
                storage_key = %artwork.storage_key,
                "Failed to delete artwork image from storage"
            );
        }

        Ok(())
    }
}
