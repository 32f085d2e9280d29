pub mod artwork_lifecycle;
pub mod upload;

pub use artwork_lifecycle::ArtworkLifecycleService;
pub use upload::ArtworkUploadService;
