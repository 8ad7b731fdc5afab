//! Video metadata repositories
//
// Repository seam used by the upload pipeline
mod repository;
//
// Implementations
mod memory;
mod video;

pub use memory::InMemoryVideoRepository;
pub use repository::VideoRepository;
pub use video::{PgVideoRepository, VideoRow};
