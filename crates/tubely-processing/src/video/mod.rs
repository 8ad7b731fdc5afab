//! Video tooling: stream probing and fast-start remuxing through ffmpeg.

mod command;
pub mod faststart;
pub mod probe;

pub use command::validate_tool_path;
pub use faststart::{FfmpegFastStart, Transcode};
pub use probe::{parse_probe_output, FfprobeProbe, MediaProbe, StreamGeometry};
