//! Test helpers: build an in-process app with fake media tools.
//!
//! Everything runs in memory: records in `InMemoryVideoRepository`, objects in
//! `MemoryStorage`, staged uploads in a per-test temp directory. Run with
//! `cargo test -p tubely-api`.

#![allow(dead_code)]

pub mod auth;
pub mod fakes;

use axum_test::TestServer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tubely_api::services::{build_resolver, ThumbnailCache, UploadPipeline, UploadPipelineParts};
use tubely_api::setup::routes::setup_routes;
use tubely_api::state::AppState;
use tubely_core::config::{BaseConfig, ServiceConfig};
use tubely_core::models::VideoRecord;
use tubely_core::{Config, StorageBackend, StorageStrategy};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::{StreamGeometry, UploadPolicy, UploadStager};
use tubely_storage::{MemoryStorage, ObjectStorage};
use uuid::Uuid;

use fakes::{FakeProbe, FakeTranscoder, FlakyRepository, FlakyStorage};

pub const TEST_BUCKET: &str = "tubely-test";
pub const TEST_BASE_URL: &str = "https://cdn.tubely.test";

/// Knobs for one test app.
#[derive(Clone)]
pub struct TestOptions {
    pub thumbnail_strategy: StorageStrategy,
    pub video_strategy: StorageStrategy,
    pub geometry: StreamGeometry,
    pub fail_probe: bool,
    pub fail_transcode: bool,
    pub fail_storage_puts: bool,
    pub fail_updates: bool,
    pub probe_delay: Option<Duration>,
    pub max_thumbnail_size_bytes: usize,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            thumbnail_strategy: StorageStrategy::Public,
            video_strategy: StorageStrategy::Signed,
            geometry: StreamGeometry {
                width: 1920,
                height: 1080,
            },
            fail_probe: false,
            fail_transcode: false,
            fail_storage_puts: false,
            fail_updates: false,
            probe_delay: None,
            max_thumbnail_size_bytes: 10 << 20,
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub config: Config,
    pub repository: InMemoryVideoRepository,
    pub storage: MemoryStorage,
    pub thumbnail_cache: ThumbnailCache,
    pub probe: Arc<FakeProbe>,
    pub transcoder: Arc<FakeTranscoder>,
    pub upload_dir: TempDir,
    fail_updates: Arc<AtomicBool>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn secret(&self) -> &str {
        self.config.jwt_secret()
    }

    /// Make record updates fail (or succeed again) from now on.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Insert a record owned by `owner`.
    pub async fn seed_video(&self, owner: Uuid) -> VideoRecord {
        let video = VideoRecord::new(owner, "Boot camp", "Fitting boots");
        self.repository.create_video(&video).await.unwrap();
        video
    }

    pub async fn stored_video(&self, id: Uuid) -> VideoRecord {
        self.repository.get_video(id).await.unwrap().unwrap()
    }

    /// Files left behind in the upload temp directory.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).unwrap().count()
    }

    /// Poll until the object store holds `expected` keys.
    pub async fn wait_for_object_count(&self, expected: usize) -> Vec<String> {
        for _ in 0..50 {
            let keys = self.storage.keys().await;
            if keys.len() == expected {
                return keys;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.storage.keys().await
    }
}

pub fn test_config(options: &TestOptions, upload_dir: &std::path::Path) -> Config {
    Config(Box::new(ServiceConfig {
        base: BaseConfig {
            jwt_secret: auth::TEST_JWT_SECRET.to_string(),
            ..BaseConfig::default()
        },
        storage_backend: StorageBackend::Memory,
        thumbnail_strategy: options.thumbnail_strategy,
        video_strategy: options.video_strategy,
        upload_temp_dir: upload_dir.to_path_buf(),
        max_thumbnail_size_bytes: options.max_thumbnail_size_bytes,
        ..ServiceConfig::default()
    }))
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let config = test_config(&options, upload_dir.path());

    let repository = InMemoryVideoRepository::new();
    let storage = MemoryStorage::new(TEST_BUCKET, TEST_BASE_URL);
    let thumbnail_cache = ThumbnailCache::new();
    let probe = Arc::new(
        FakeProbe::new(options.geometry, options.fail_probe).with_delay(options.probe_delay),
    );
    let transcoder = Arc::new(FakeTranscoder::new(options.fail_transcode));

    let object_store: Arc<dyn ObjectStorage> = Arc::new(FlakyStorage::new(
        storage.clone(),
        options.fail_storage_puts,
    ));
    let fail_updates = Arc::new(AtomicBool::new(options.fail_updates));
    let records: Arc<dyn VideoRepository> = Arc::new(FlakyRepository::new(
        repository.clone(),
        fail_updates.clone(),
    ));

    let ttl = config.signed_url_ttl();
    let pipeline = UploadPipeline::new(UploadPipelineParts {
        repository: records,
        stager: UploadStager::new(upload_dir.path()),
        probe: probe.clone(),
        transcoder: transcoder.clone(),
        thumbnails: build_resolver(
            options.thumbnail_strategy,
            object_store.clone(),
            thumbnail_cache.clone(),
            ttl,
        ),
        videos: build_resolver(
            options.video_strategy,
            object_store,
            thumbnail_cache.clone(),
            ttl,
        ),
        thumbnail_policy: UploadPolicy::thumbnails(&config),
        video_policy: UploadPolicy::videos(&config),
    });

    let state = Arc::new(AppState {
        config: config.clone(),
        pipeline: Arc::new(pipeline),
        thumbnail_cache: thumbnail_cache.clone(),
    });
    let router = setup_routes(&config, state).unwrap();
    let server = TestServer::new(router).unwrap();

    TestApp {
        server,
        config,
        repository,
        storage,
        thumbnail_cache,
        probe,
        transcoder,
        upload_dir,
        fail_updates,
    }
}
