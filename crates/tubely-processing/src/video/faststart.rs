//! Fast-start remux: moves the MP4 index ahead of the media data so playback
//! can begin before the whole file has downloaded. Streams are copied, never
//! re-encoded.

use std::ffi::OsStr;

use async_trait::async_trait;

use super::command::{run_tool, validate_tool_path};
use crate::error::{ToolError, TranscodeError};
use crate::staging::StagedArtifact;

const OUTPUT_LABEL: &str = "faststart";

#[async_trait]
pub trait Transcode: Send + Sync {
    /// Produce a fast-start copy of `input` as a new artifact.
    ///
    /// `input` is left untouched. On failure no output file remains.
    async fn fast_start(&self, input: &StagedArtifact) -> Result<StagedArtifact, TranscodeError>;
}

pub struct FfmpegFastStart {
    ffmpeg_path: String,
}

impl FfmpegFastStart {
    pub fn new(ffmpeg_path: impl Into<String>) -> Result<Self, ToolError> {
        let ffmpeg_path = ffmpeg_path.into();
        validate_tool_path(&ffmpeg_path)?;
        Ok(Self { ffmpeg_path })
    }
}

#[async_trait]
impl Transcode for FfmpegFastStart {
    #[tracing::instrument(skip(self, input), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        input_bytes = input.len(),
    ))]
    async fn fast_start(&self, input: &StagedArtifact) -> Result<StagedArtifact, TranscodeError> {
        let start = std::time::Instant::now();
        let output = input.derive(OUTPUT_LABEL)?;

        // `output` deletes its file on drop, so an early return here leaves nothing behind
        run_tool(
            &self.ffmpeg_path,
            [
                OsStr::new("-i"),
                input.path().as_os_str(),
                OsStr::new("-c"),
                OsStr::new("copy"),
                OsStr::new("-movflags"),
                OsStr::new("faststart"),
                OsStr::new("-f"),
                OsStr::new("mp4"),
                OsStr::new("-y"),
                output.path().as_os_str(),
            ],
        )
        .await?;

        let artifact = output.finish().await?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            output_bytes = artifact.len(),
            "Fast-start remux completed"
        );

        Ok(artifact)
    }
}
