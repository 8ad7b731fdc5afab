use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;
use tubely_core::AppError;

use super::parse_video_id;

/// Serve a thumbnail held in the process-local cache.
#[utoipa::path(
    get,
    path = "/api/thumbnails/{video_id}",
    tag = "videos",
    params(
        ("video_id" = uuid::Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Thumbnail bytes with their stored content type"),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "No cached thumbnail", body = ErrorResponse)
    )
)]
pub async fn get_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;

    let entry = state
        .thumbnail_cache
        .get(video_id)
        .await
        .ok_or_else(|| AppError::NotFound("Thumbnail not found".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, entry.content_type),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        entry.data,
    ))
}
