use async_trait::async_trait;
use tubely_core::models::StorageReference;
use tubely_core::{AppError, StorageStrategy};

use super::{PlacedReference, Placement, StorageReferenceResolver};

/// Bytes stored inline on the record as a base64 `data:` URI.
pub struct EmbeddedResolver;

#[async_trait]
impl StorageReferenceResolver for EmbeddedResolver {
    fn strategy(&self) -> StorageStrategy {
        StorageStrategy::Embedded
    }

    async fn place(&self, placement: Placement<'_>) -> Result<PlacedReference, AppError> {
        let artifact = placement.artifact;
        let reference = StorageReference::Embedded {
            data: artifact.read().await?.to_vec(),
            content_type: artifact.content_type().to_string(),
        };
        let persisted = reference
            .to_data_uri()
            .ok_or_else(|| AppError::Internal("Embedded reference has no data URI".to_string()))?;

        tracing::debug!(
            video_id = %placement.video_id,
            size_bytes = artifact.len(),
            encoded_len = persisted.len(),
            "Artifact embedded as data URI"
        );

        Ok(PlacedReference {
            reference,
            persisted,
            pending: None,
        })
    }

    async fn resolve(&self, persisted: &str) -> Result<String, AppError> {
        Ok(persisted.to_string())
    }

    async fn discard(&self, _placed: &PlacedReference) -> Result<(), AppError> {
        Ok(())
    }
}
