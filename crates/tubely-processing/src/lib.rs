//! Tubely Processing Library
//!
//! Everything that happens to an upload between the request body and the
//! storage backend: staging to a temporary file, content-type validation,
//! stream geometry probing, aspect classification and fast-start remuxing.

pub mod aspect;
pub mod error;
pub mod staging;
pub mod validator;
#[cfg(feature = "video")]
pub mod video;

pub use aspect::{classify, AspectClass};
pub use error::{DimensionError, ProbeError, StagingError, ToolError, TranscodeError};
pub use staging::{PendingArtifact, StagedArtifact, UploadStager};
pub use validator::UploadPolicy;
#[cfg(feature = "video")]
pub use video::{FfmpegFastStart, FfprobeProbe, MediaProbe, StreamGeometry, Transcode};
