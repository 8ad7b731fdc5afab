//! Tubely Storage Library
//!
//! Object storage abstraction used by the upload pipeline, with S3, local
//! filesystem and in-memory backends.
//!
//! # Key format
//!
//! Object keys are `{prefix}{name}.{extension}`. Videos carry an aspect prefix
//! (`landscape/`, `portrait/`, `other/`); thumbnails are flat. Keys must not
//! contain `..` or a leading `/`. See the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::object_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectStorage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
