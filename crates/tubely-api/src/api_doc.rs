//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use tubely_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video upload and publishing API. Thumbnails and videos are uploaded as multipart forms with a bearer token; videos are probed, classified by aspect ratio and remuxed for fast start before storage."
    ),
    paths(
        handlers::thumbnail_upload::upload_thumbnail,
        handlers::video_upload::upload_video,
        handlers::video_get::get_video,
        handlers::thumbnail_get::get_thumbnail,
    ),
    components(
        schemas(
            models::VideoRecord,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "videos", description = "Thumbnail and video uploads, video reads")
    )
)]
pub struct ApiDoc;
