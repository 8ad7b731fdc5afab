use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tubely_core::models::StorageReference;
use tubely_core::{AppError, StorageStrategy};
use tubely_storage::{object_key, ObjectStorage};

use super::{PlacedReference, Placement, StorageReferenceResolver};

async fn upload(
    storage: &dyn ObjectStorage,
    placement: &Placement<'_>,
) -> Result<(String, String), AppError> {
    let artifact = placement.artifact;
    let bucket = storage.bucket().to_string();
    let key = object_key(placement.prefix, artifact.name(), artifact.extension());
    let data = artifact.read().await?;

    storage
        .put(&bucket, &key, data, artifact.content_type())
        .await?;

    tracing::info!(
        video_id = %placement.video_id,
        bucket = %bucket,
        key = %key,
        size_bytes = artifact.len(),
        "Artifact stored"
    );

    Ok((bucket, key))
}

async fn remove(storage: &dyn ObjectStorage, placed: &PlacedReference) -> Result<(), AppError> {
    if let StorageReference::Object { bucket, key } = &placed.reference {
        storage.delete(bucket, key).await?;
    }
    Ok(())
}

/// Objects addressed by a permanent public URL.
pub struct PublicObjectResolver {
    storage: Arc<dyn ObjectStorage>,
}

impl PublicObjectResolver {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl StorageReferenceResolver for PublicObjectResolver {
    fn strategy(&self) -> StorageStrategy {
        StorageStrategy::Public
    }

    async fn place(&self, placement: Placement<'_>) -> Result<PlacedReference, AppError> {
        let (bucket, key) = upload(self.storage.as_ref(), &placement).await?;
        let persisted = self.storage.public_url(&bucket, &key);
        Ok(PlacedReference {
            reference: StorageReference::Object { bucket, key },
            persisted,
            pending: None,
        })
    }

    async fn resolve(&self, persisted: &str) -> Result<String, AppError> {
        Ok(persisted.to_string())
    }

    async fn discard(&self, placed: &PlacedReference) -> Result<(), AppError> {
        remove(self.storage.as_ref(), placed).await
    }
}

/// Objects persisted as `{bucket},{key}` and signed again on every read.
pub struct SignedObjectResolver {
    storage: Arc<dyn ObjectStorage>,
    ttl: Duration,
}

impl SignedObjectResolver {
    pub fn new(storage: Arc<dyn ObjectStorage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }
}

#[async_trait]
impl StorageReferenceResolver for SignedObjectResolver {
    fn strategy(&self) -> StorageStrategy {
        StorageStrategy::Signed
    }

    async fn place(&self, placement: Placement<'_>) -> Result<PlacedReference, AppError> {
        let (bucket, key) = upload(self.storage.as_ref(), &placement).await?;
        let reference = StorageReference::Object { bucket, key };
        let persisted = reference
            .to_signed_form()
            .ok_or_else(|| AppError::Internal("Object reference has no signed form".to_string()))?;
        Ok(PlacedReference {
            reference,
            persisted,
            pending: None,
        })
    }

    async fn resolve(&self, persisted: &str) -> Result<String, AppError> {
        let (bucket, key) = match StorageReference::from_signed_form(persisted) {
            Some(StorageReference::Object { bucket, key }) => (bucket, key),
            _ => {
                return Err(AppError::Internal(format!(
                    "Malformed storage reference: {}",
                    persisted
                )))
            }
        };

        let url = self.storage.presign_get(&bucket, &key, self.ttl).await?;
        Ok(url)
    }

    async fn discard(&self, placed: &PlacedReference) -> Result<(), AppError> {
        remove(self.storage.as_ref(), placed).await
    }
}
