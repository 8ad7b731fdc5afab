use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tubely_core::models::VideoRecord;
use tubely_core::AppError;
use uuid::Uuid;

use super::repository::VideoRepository;

/// Process-local video store for development and tests.
#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<RwLock<HashMap<Uuid, VideoRecord>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.videos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.videos.read().await.is_empty()
    }

    async fn modify(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut VideoRecord),
    ) -> Result<VideoRecord, AppError> {
        let mut videos = self.videos.write().await;
        let existing = videos
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;
        apply(existing);
        existing.updated_at = chrono::Utc::now();
        Ok(existing.clone())
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, AppError> {
        self.modify(id, |v| v.thumbnail_url = Some(url.to_string()))
            .await
    }

    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, AppError> {
        self.modify(id, |v| v.video_url = Some(url.to_string())).await
    }

    async fn create_video(&self, video: &VideoRecord) -> Result<(), AppError> {
        self.videos.write().await.insert(video.id, video.clone());
        Ok(())
    }
}
