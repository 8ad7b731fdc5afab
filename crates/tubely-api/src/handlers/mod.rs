//! HTTP handlers

pub mod thumbnail_get;
pub mod thumbnail_upload;
pub mod video_get;
pub mod video_upload;

use tubely_core::AppError;
use uuid::Uuid;

/// Parse the `{video_id}` path segment.
pub(crate) fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid ID".to_string()))
}

fn missing_field(name: &str) -> AppError {
    AppError::BadRequest(format!("Missing form field '{}'", name))
}

fn malformed_form(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Unable to parse form: {}", err.body_text()))
}
