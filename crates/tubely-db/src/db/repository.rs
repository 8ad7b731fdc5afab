use async_trait::async_trait;
use tubely_core::models::VideoRecord;
use tubely_core::AppError;
use uuid::Uuid;

/// Persistence operations the upload pipeline depends on.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Fetch one record. `Ok(None)` when the id is unknown.
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError>;

    /// Set only the thumbnail reference and return the stored record.
    ///
    /// Other fields written concurrently are left untouched. Fails with
    /// `NotFound` when the record has disappeared since it was read.
    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, AppError>;

    /// Set only the media reference and return the stored record.
    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, AppError>;

    /// Insert a new record.
    async fn create_video(&self, video: &VideoRecord) -> Result<(), AppError>;
}
