//! Pipeline assembly from configuration

use crate::services::{build_resolver, ThumbnailCache, UploadPipeline, UploadPipelineParts};
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{FfmpegFastStart, FfprobeProbe, UploadPolicy, UploadStager};
use tubely_storage::ObjectStorage;

pub async fn initialize_services(
    config: &Config,
    repository: Arc<dyn VideoRepository>,
    storage: Arc<dyn ObjectStorage>,
) -> Result<Arc<AppState>> {
    tokio::fs::create_dir_all(config.upload_temp_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create upload temp dir {}",
                config.upload_temp_dir().display()
            )
        })?;

    let probe = FfprobeProbe::new(config.ffprobe_path()).context("Invalid FFPROBE_PATH")?;
    let transcoder = FfmpegFastStart::new(config.ffmpeg_path()).context("Invalid FFMPEG_PATH")?;

    let thumbnail_cache = ThumbnailCache::new();
    let thumbnails = build_resolver(
        config.thumbnail_strategy(),
        storage.clone(),
        thumbnail_cache.clone(),
        config.signed_url_ttl(),
    );
    let videos = build_resolver(
        config.video_strategy(),
        storage,
        thumbnail_cache.clone(),
        config.signed_url_ttl(),
    );

    let pipeline = UploadPipeline::new(UploadPipelineParts {
        repository,
        stager: UploadStager::new(config.upload_temp_dir()),
        probe: Arc::new(probe),
        transcoder: Arc::new(transcoder),
        thumbnails,
        videos,
        thumbnail_policy: UploadPolicy::thumbnails(config),
        video_policy: UploadPolicy::videos(config),
    });

    tracing::info!(
        upload_temp_dir = %config.upload_temp_dir().display(),
        max_video_mb = config.max_video_size_bytes() / 1024 / 1024,
        max_thumbnail_mb = config.max_thumbnail_size_bytes() / 1024 / 1024,
        "Upload pipeline ready"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        pipeline: Arc::new(pipeline),
        thumbnail_cache,
    }))
}
