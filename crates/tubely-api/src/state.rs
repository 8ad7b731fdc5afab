//! Application state shared by all handlers.

use crate::services::{ThumbnailCache, UploadPipeline};
use std::sync::Arc;
use tubely_core::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<UploadPipeline>,
    /// Backing store for the `cache` thumbnail strategy and `/api/thumbnails`
    pub thumbnail_cache: ThumbnailCache,
}
