use crate::auth::authenticate;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::InboundUpload;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;
use tubely_core::constants::THUMBNAIL_FIELD;
use tubely_core::models::VideoRecord;

use super::{malformed_form, missing_field, parse_video_id};

#[utoipa::path(
    put,
    path = "/api/thumbnail_upload/{video_id}",
    tag = "videos",
    params(
        ("video_id" = uuid::Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Form with a `thumbnail` file part (image/jpeg or image/png)"),
    responses(
        (status = 200, description = "Thumbnail stored", body = VideoRecord),
        (status = 400, description = "Invalid ID, form or file type", body = ErrorResponse),
        (status = 401, description = "Missing token or not the owner", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoRecord>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let caller = authenticate(&headers, state.config.jwt_secret())?;
    let mut multipart = multipart.map_err(HttpAppError::from_multipart_rejection)?;

    tracing::info!(video_id = %video_id, user_id = %caller, "Uploading thumbnail");

    while let Some(field) = multipart.next_field().await.map_err(malformed_form)? {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }

        let upload = InboundUpload {
            content_type: field.content_type().map(str::to_string),
            body: field,
        };
        let video = state
            .pipeline
            .upload_thumbnail(caller, video_id, upload)
            .await?;
        return Ok(Json(video));
    }

    Err(missing_field(THUMBNAIL_FIELD).into())
}
