//! Storage reference resolvers
//!
//! A resolver decides where a finished artifact lives and what string is
//! persisted on the video record to find it again. One resolver is chosen per
//! asset kind at startup from [`StorageStrategy`].

mod cache;
mod embedded;
mod object;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tubely_core::models::StorageReference;
use tubely_core::{AppError, StorageStrategy};
use tubely_processing::StagedArtifact;
use tubely_storage::ObjectStorage;
use uuid::Uuid;

use super::thumbnail_cache::{ThumbnailCache, ThumbnailEntry};

pub use cache::CacheResolver;
pub use embedded::EmbeddedResolver;
pub use object::{PublicObjectResolver, SignedObjectResolver};

/// What to place and under which namespace.
pub struct Placement<'a> {
    pub video_id: Uuid,
    pub artifact: &'a StagedArtifact,
    /// Key prefix, empty or ending in `/`
    pub prefix: &'a str,
}

/// Result of a successful placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedReference {
    pub reference: StorageReference,
    /// Value written to the video record
    pub persisted: String,
    /// Bytes held back until the record points at them
    pub pending: Option<ThumbnailEntry>,
}

#[async_trait]
pub trait StorageReferenceResolver: Send + Sync {
    fn strategy(&self) -> StorageStrategy;

    /// Store the artifact's bytes and describe where they went.
    async fn place(&self, placement: Placement<'_>) -> Result<PlacedReference, AppError>;

    /// Turn a persisted value into a URL a client can fetch right now.
    async fn resolve(&self, persisted: &str) -> Result<String, AppError>;

    /// Make a placement visible once the record references it.
    async fn publish(&self, _placed: &PlacedReference) -> Result<(), AppError> {
        Ok(())
    }

    /// Remove a placement that never made it onto a record.
    async fn discard(&self, placed: &PlacedReference) -> Result<(), AppError>;
}

/// Build the resolver for a configured strategy.
pub fn build_resolver(
    strategy: StorageStrategy,
    storage: Arc<dyn ObjectStorage>,
    cache: ThumbnailCache,
    signed_url_ttl: Duration,
) -> Arc<dyn StorageReferenceResolver> {
    match strategy {
        StorageStrategy::Public => Arc::new(PublicObjectResolver::new(storage)),
        StorageStrategy::Signed => Arc::new(SignedObjectResolver::new(storage, signed_url_ttl)),
        StorageStrategy::Embedded => Arc::new(EmbeddedResolver),
        StorageStrategy::Cache => Arc::new(CacheResolver::new(cache)),
    }
}
