//! Stand-ins for ffprobe, ffmpeg, storage and the database.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tubely_core::models::VideoRecord;
use tubely_core::{AppError, StorageBackend};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::{
    MediaProbe, ProbeError, StagedArtifact, StreamGeometry, ToolError, Transcode, TranscodeError,
};
use tubely_storage::{MemoryStorage, ObjectStorage, StorageError, StorageResult};
use uuid::Uuid;

/// Reports fixed geometry and remembers the paths it was asked about.
pub struct FakeProbe {
    geometry: StreamGeometry,
    fail: bool,
    delay: Option<Duration>,
    seen: Mutex<Vec<PathBuf>>,
}

impl FakeProbe {
    pub fn new(geometry: StreamGeometry, fail: bool) -> Self {
        Self {
            geometry,
            fail,
            delay: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Hold every probe for `delay` before answering.
    pub fn with_delay(mut self, delay: Option<Duration>) -> Self {
        self.delay = delay;
        self
    }

    pub fn seen(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaProbe for FakeProbe {
    async fn probe(&self, path: &Path) -> Result<StreamGeometry, ProbeError> {
        self.seen.lock().unwrap().push(path.to_path_buf());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ProbeError::Tool(ToolError::Failed {
                program: "ffprobe".to_string(),
                status: Some(1),
                stderr: "Invalid data found when processing input".to_string(),
            }));
        }
        Ok(self.geometry)
    }
}

/// Copies the input into a derived artifact, prefixed with a marker.
pub struct FakeTranscoder {
    fail: bool,
    calls: AtomicUsize,
}

pub const FASTSTART_MARKER: &[u8] = b"moov:";

impl FakeTranscoder {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcode for FakeTranscoder {
    async fn fast_start(&self, input: &StagedArtifact) -> Result<StagedArtifact, TranscodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let pending = input.derive("faststart")?;
        if self.fail {
            return Err(TranscodeError::Tool(ToolError::Failed {
                program: "ffmpeg".to_string(),
                status: Some(1),
                stderr: "moov atom not found".to_string(),
            }));
        }
        let mut data = FASTSTART_MARKER.to_vec();
        data.extend_from_slice(&input.read().await.map_err(tubely_processing::StagingError::Io)?);
        tokio::fs::write(pending.path(), data)
            .await
            .map_err(tubely_processing::StagingError::Io)?;
        Ok(pending.finish().await?)
    }
}

/// Memory storage whose writes can be made to fail.
pub struct FlakyStorage {
    inner: MemoryStorage,
    fail_puts: bool,
}

impl FlakyStorage {
    pub fn new(inner: MemoryStorage, fail_puts: bool) -> Self {
        Self { inner, fail_puts }
    }
}

#[async_trait]
impl ObjectStorage for FlakyStorage {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        if self.fail_puts {
            return Err(StorageError::UploadFailed("bucket unreachable".to_string()));
        }
        self.inner.put(bucket, key, data, content_type).await
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        self.inner.get(bucket, key).await
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.inner.delete(bucket, key).await
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.inner.presign_get(bucket, key, expires_in).await
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        self.inner.public_url(bucket, key)
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

/// In-memory repository whose updates can be made to fail, switchable while
/// the app is running.
pub struct FlakyRepository {
    inner: InMemoryVideoRepository,
    fail_updates: Arc<AtomicBool>,
}

impl FlakyRepository {
    pub fn new(inner: InMemoryVideoRepository, fail_updates: Arc<AtomicBool>) -> Self {
        Self {
            inner,
            fail_updates,
        }
    }

    fn check(&self) -> Result<(), AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Database("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl VideoRepository for FlakyRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        self.inner.get_video(id).await
    }

    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, AppError> {
        self.check()?;
        self.inner.set_thumbnail_url(id, url).await
    }

    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, AppError> {
        self.check()?;
        self.inner.set_video_url(id, url).await
    }

    async fn create_video(&self, video: &VideoRecord) -> Result<(), AppError> {
        self.inner.create_video(video).await
    }
}
