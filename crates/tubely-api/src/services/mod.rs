//! Upload pipeline services

pub mod guard;
pub mod pipeline;
pub mod resolver;
pub mod thumbnail_cache;

pub use pipeline::{InboundUpload, PipelineStage, UploadPipeline, UploadPipelineParts};
pub use resolver::{build_resolver, PlacedReference, Placement, StorageReferenceResolver};
pub use thumbnail_cache::{ThumbnailCache, ThumbnailEntry};
