//! Upload pipeline
//!
//! One run per request, stages strictly in order:
//!
//! ```text
//! Authenticated -> OwnershipChecked -> Staged -> [Probed -> Classified -> Transcoded]
//!               -> Stored -> MetadataUpdated
//! ```
//!
//! The bracketed stages apply to videos only. A failure at any stage returns
//! immediately; staged artifacts are dropped (and so deleted) on the way out.
//! Only the uploaded field is written, once, after placement has succeeded.

use std::fmt::{self, Display};
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use tubely_core::models::VideoRecord;
use tubely_core::AppError;
use tubely_db::VideoRepository;
use tubely_processing::{
    classify, MediaProbe, StagedArtifact, Transcode, UploadPolicy, UploadStager,
};
use uuid::Uuid;

use super::guard::ensure_owner;
use super::resolver::{PlacedReference, Placement, StorageReferenceResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Authenticated,
    OwnershipChecked,
    Staged,
    Probed,
    Classified,
    Transcoded,
    Stored,
    MetadataUpdated,
}

impl Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Authenticated => "authenticated",
            PipelineStage::OwnershipChecked => "ownership_checked",
            PipelineStage::Staged => "staged",
            PipelineStage::Probed => "probed",
            PipelineStage::Classified => "classified",
            PipelineStage::Transcoded => "transcoded",
            PipelineStage::Stored => "stored",
            PipelineStage::MetadataUpdated => "metadata_updated",
        };
        f.write_str(name)
    }
}

/// Tracks the last stage reached so failures can be attributed.
struct Run {
    asset: &'static str,
    video_id: Uuid,
    stage: PipelineStage,
}

impl Run {
    fn start(asset: &'static str, video_id: Uuid) -> Self {
        Self {
            asset,
            video_id,
            stage: PipelineStage::Authenticated,
        }
    }

    fn advance(&mut self, stage: PipelineStage) {
        tracing::debug!(
            asset = self.asset,
            video_id = %self.video_id,
            from = %self.stage,
            to = %stage,
            "Pipeline stage completed"
        );
        self.stage = stage;
    }

    fn fail<E: Into<AppError>>(&self, err: E) -> AppError {
        let err = err.into();
        tracing::debug!(
            asset = self.asset,
            video_id = %self.video_id,
            last_stage = %self.stage,
            error = %err,
            "Pipeline failed"
        );
        err
    }
}

/// A file part as it arrives from the client.
pub struct InboundUpload<S> {
    /// Content type declared on the part
    pub content_type: Option<String>,
    pub body: S,
}

/// Collaborators the pipeline is assembled from.
pub struct UploadPipelineParts {
    pub repository: Arc<dyn VideoRepository>,
    pub stager: UploadStager,
    pub probe: Arc<dyn MediaProbe>,
    pub transcoder: Arc<dyn Transcode>,
    pub thumbnails: Arc<dyn StorageReferenceResolver>,
    pub videos: Arc<dyn StorageReferenceResolver>,
    pub thumbnail_policy: UploadPolicy,
    pub video_policy: UploadPolicy,
}

pub struct UploadPipeline {
    repository: Arc<dyn VideoRepository>,
    stager: UploadStager,
    probe: Arc<dyn MediaProbe>,
    transcoder: Arc<dyn Transcode>,
    thumbnails: Arc<dyn StorageReferenceResolver>,
    videos: Arc<dyn StorageReferenceResolver>,
    thumbnail_policy: UploadPolicy,
    video_policy: UploadPolicy,
}

impl UploadPipeline {
    pub fn new(parts: UploadPipelineParts) -> Self {
        Self {
            repository: parts.repository,
            stager: parts.stager,
            probe: parts.probe,
            transcoder: parts.transcoder,
            thumbnails: parts.thumbnails,
            videos: parts.videos,
            thumbnail_policy: parts.thumbnail_policy,
            video_policy: parts.video_policy,
        }
    }

    pub fn thumbnail_policy(&self) -> &UploadPolicy {
        &self.thumbnail_policy
    }

    pub fn video_policy(&self) -> &UploadPolicy {
        &self.video_policy
    }

    /// Replace a video's thumbnail.
    #[tracing::instrument(skip_all, fields(video_id = %video_id, user_id = %caller))]
    pub async fn upload_thumbnail<S, E>(
        &self,
        caller: Uuid,
        video_id: Uuid,
        upload: InboundUpload<S>,
    ) -> Result<VideoRecord, AppError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let mut run = Run::start("thumbnail", video_id);

        ensure_owner(self.repository.as_ref(), caller, video_id)
            .await
            .map_err(|e| run.fail(e))?;
        run.advance(PipelineStage::OwnershipChecked);

        let artifact = self
            .stager
            .stage(
                upload.content_type.as_deref(),
                upload.body,
                &self.thumbnail_policy,
            )
            .await
            .map_err(|e| run.fail(e))?;
        run.advance(PipelineStage::Staged);

        let placed = self
            .thumbnails
            .place(Placement {
                video_id,
                artifact: &artifact,
                prefix: "",
            })
            .await
            .map_err(|e| run.fail(e))?;
        run.advance(PipelineStage::Stored);
        release(artifact);

        let video = self
            .commit(video_id, MediaField::Thumbnail, placed, &self.thumbnails)
            .await
            .map_err(|e| run.fail(e))?;
        run.advance(PipelineStage::MetadataUpdated);

        self.resolve_record(video).await
    }

    /// Replace a video's media file.
    #[tracing::instrument(skip_all, fields(video_id = %video_id, user_id = %caller))]
    pub async fn upload_video<S, E>(
        &self,
        caller: Uuid,
        video_id: Uuid,
        upload: InboundUpload<S>,
    ) -> Result<VideoRecord, AppError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let mut run = Run::start("video", video_id);

        ensure_owner(self.repository.as_ref(), caller, video_id)
            .await
            .map_err(|e| run.fail(e))?;
        run.advance(PipelineStage::OwnershipChecked);

        let original = self
            .stager
            .stage(upload.content_type.as_deref(), upload.body, &self.video_policy)
            .await
            .map_err(|e| run.fail(e))?;
        run.advance(PipelineStage::Staged);

        let geometry = self
            .probe
            .probe(original.path())
            .await
            .map_err(|e| run.fail(e))?;
        run.advance(PipelineStage::Probed);

        let class = classify(geometry.width, geometry.height).map_err(|e| run.fail(e))?;
        run.advance(PipelineStage::Classified);
        tracing::info!(
            width = geometry.width,
            height = geometry.height,
            aspect = %class,
            "Video classified"
        );

        let processed = self
            .transcoder
            .fast_start(&original)
            .await
            .map_err(|e| run.fail(e))?;
        run.advance(PipelineStage::Transcoded);
        release(original);

        let placed = self
            .videos
            .place(Placement {
                video_id,
                artifact: &processed,
                prefix: class.prefix(),
            })
            .await
            .map_err(|e| run.fail(e))?;
        run.advance(PipelineStage::Stored);
        release(processed);

        let video = self
            .commit(video_id, MediaField::Video, placed, &self.videos)
            .await
            .map_err(|e| run.fail(e))?;
        run.advance(PipelineStage::MetadataUpdated);

        self.resolve_record(video).await
    }

    /// Fetch a record with its references resolved for the client.
    pub async fn get_video(&self, video_id: Uuid) -> Result<VideoRecord, AppError> {
        let video = self
            .repository
            .get_video(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;
        self.resolve_record(video).await
    }

    /// Swap persisted references for client URLs (signing where needed).
    pub async fn resolve_record(&self, mut video: VideoRecord) -> Result<VideoRecord, AppError> {
        if let Some(persisted) = video.thumbnail_url.take() {
            video.thumbnail_url = Some(self.thumbnails.resolve(&persisted).await?);
        }
        if let Some(persisted) = video.video_url.take() {
            video.video_url = Some(self.videos.resolve(&persisted).await?);
        }
        Ok(video)
    }

    /// Point the record's field at the placement. Only that field is
    /// written, so a concurrent upload of the other asset is not lost. If the
    /// write fails the placement is orphaned and is discarded in the background.
    async fn commit(
        &self,
        video_id: Uuid,
        field: MediaField,
        placed: PlacedReference,
        resolver: &Arc<dyn StorageReferenceResolver>,
    ) -> Result<VideoRecord, AppError> {
        let written = match field {
            MediaField::Thumbnail => {
                self.repository
                    .set_thumbnail_url(video_id, &placed.persisted)
                    .await
            }
            MediaField::Video => {
                self.repository
                    .set_video_url(video_id, &placed.persisted)
                    .await
            }
        };

        let video = match written {
            Ok(video) => video,
            Err(e) => {
                let resolver = resolver.clone();
                tokio::spawn(async move {
                    if let Err(cleanup_err) = resolver.discard(&placed).await {
                        tracing::warn!(
                            error = %cleanup_err,
                            video_id = %video_id,
                            "Failed to discard placement after metadata update error"
                        );
                    }
                });
                return Err(e);
            }
        };

        resolver.publish(&placed).await?;
        Ok(video)
    }
}

#[derive(Debug, Clone, Copy)]
enum MediaField {
    Thumbnail,
    Video,
}

fn release(artifact: StagedArtifact) {
    let name = artifact.name().to_string();
    if let Err(e) = artifact.release() {
        tracing::warn!(error = %e, artifact = %name, "Failed to delete staged artifact");
    }
}
