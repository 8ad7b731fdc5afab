use async_trait::async_trait;
use tubely_core::models::StorageReference;
use tubely_core::{AppError, StorageStrategy};

use super::{PlacedReference, Placement, StorageReferenceResolver};
use crate::services::thumbnail_cache::{ThumbnailCache, ThumbnailEntry};

/// Bytes kept in the process-local [`ThumbnailCache`] and served by the API.
///
/// The entry is only written on [`publish`](StorageReferenceResolver::publish),
/// so a failed record update leaves the previous thumbnail in place.
pub struct CacheResolver {
    cache: ThumbnailCache,
}

impl CacheResolver {
    pub fn new(cache: ThumbnailCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl StorageReferenceResolver for CacheResolver {
    fn strategy(&self) -> StorageStrategy {
        StorageStrategy::Cache
    }

    async fn place(&self, placement: Placement<'_>) -> Result<PlacedReference, AppError> {
        let artifact = placement.artifact;
        let entry = ThumbnailEntry {
            data: artifact.read().await?,
            content_type: artifact.content_type().to_string(),
        };
        let reference = StorageReference::Cached {
            video_id: placement.video_id,
        };
        let persisted = reference
            .to_cache_path()
            .ok_or_else(|| AppError::Internal("Cached reference has no path".to_string()))?;

        Ok(PlacedReference {
            reference,
            persisted,
            pending: Some(entry),
        })
    }

    async fn resolve(&self, persisted: &str) -> Result<String, AppError> {
        Ok(persisted.to_string())
    }

    async fn publish(&self, placed: &PlacedReference) -> Result<(), AppError> {
        let (StorageReference::Cached { video_id }, Some(entry)) =
            (&placed.reference, &placed.pending)
        else {
            return Err(AppError::Internal(
                "Cache placement has nothing to publish".to_string(),
            ));
        };
        self.cache.insert(*video_id, entry.clone()).await;
        Ok(())
    }

    async fn discard(&self, _placed: &PlacedReference) -> Result<(), AppError> {
        // nothing was written at placement
        Ok(())
    }
}
