//! Tubely Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration and
//! storage strategy types shared by every Tubely crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::{StorageBackend, StorageStrategy};
