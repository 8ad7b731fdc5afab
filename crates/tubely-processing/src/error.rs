//! Processing errors and their mapping onto `AppError`.

use tubely_core::AppError;

/// Failures while draining an upload into a temporary artifact
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("Missing Content-Type on file part")]
    MissingContentType,

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidMediaType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File exceeds maximum size of {max} bytes")]
    TooLarge { max: usize },

    #[error("Empty file")]
    EmptyFile,

    #[error("Upload stream error: {0}")]
    Stream(String),

    #[error("Entropy source unavailable: {0}")]
    Entropy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures running an external media tool
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid tool path: {0}")]
    InvalidPath(String),

    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {status:?}: {stderr}")]
    Failed {
        program: String,
        status: Option<i32>,
        stderr: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Failed to parse probe output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No video stream found")]
    NoVideoStream,

    #[error("Video stream has no dimensions")]
    MissingDimensions,
}

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Output artifact error: {0}")]
    Artifact(#[from] StagingError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid dimensions: {width}x{height}")]
pub struct DimensionError {
    pub width: i64,
    pub height: i64,
}

impl From<StagingError> for AppError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::MissingContentType => {
                AppError::BadRequest("Missing Content-Type for file".to_string())
            }
            StagingError::InvalidMediaType {
                content_type,
                allowed,
            } => AppError::InvalidMediaType {
                content_type,
                allowed,
            },
            StagingError::TooLarge { max } => {
                AppError::PayloadTooLarge(format!("File exceeds maximum size of {} bytes", max))
            }
            StagingError::EmptyFile => AppError::BadRequest("File is empty".to_string()),
            StagingError::Stream(msg) => {
                AppError::BadRequest(format!("Unable to read upload body: {}", msg))
            }
            StagingError::Entropy(msg) => AppError::Internal(msg),
            StagingError::Io(err) => AppError::Internal(format!("Temp file error: {}", err)),
        }
    }
}

impl From<ProbeError> for AppError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::NoVideoStream | ProbeError::MissingDimensions => {
                AppError::BadRequest(err.to_string())
            }
            other => AppError::Probe(other.to_string()),
        }
    }
}

impl From<TranscodeError> for AppError {
    fn from(err: TranscodeError) -> Self {
        AppError::Transcode(err.to_string())
    }
}

impl From<DimensionError> for AppError {
    fn from(err: DimensionError) -> Self {
        AppError::InvalidDimensions {
            width: err.width,
            height: err.height,
        }
    }
}
