//! Video upload integration tests.
//!
//! ffprobe and ffmpeg are replaced by fakes; see `helpers::fakes`.
//! Run with: `cargo test -p tubely-api --test video_upload_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use bytes::Bytes;
use helpers::auth::TestUser;
use helpers::fakes::FASTSTART_MARKER;
use helpers::{setup_test_app, setup_test_app_with, TestApp, TestOptions, TEST_BASE_URL, TEST_BUCKET};
use tubely_core::StorageStrategy;
use tubely_processing::StreamGeometry;

const MP4: &[u8] = b"\x00\x00\x00\x18ftypmp42mdat-video-bytes";

fn video_form(data: &'static [u8], mime: &str) -> MultipartForm {
    let part = Part::bytes(Bytes::from_static(data))
        .file_name("clip.mp4")
        .mime_type(mime);
    MultipartForm::new().add_part("video", part)
}

fn with_geometry(width: i64, height: i64) -> TestOptions {
    TestOptions {
        geometry: StreamGeometry { width, height },
        ..TestOptions::default()
    }
}

async fn upload(app: &TestApp, user: &TestUser, video_id: uuid::Uuid) -> axum_test::TestResponse {
    app.client()
        .put(&format!("/api/video_upload/{}", video_id))
        .add_header("Authorization", user.bearer())
        .multipart(video_form(MP4, "video/mp4"))
        .await
}

#[tokio::test]
async fn test_landscape_video_is_signed_and_processed() {
    let app = setup_test_app().await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let response = upload(&app, &user, video.id).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // persisted as bucket,key
    let record = app.stored_video(video.id).await;
    let persisted = record.video_url.unwrap();
    let (bucket, key) = persisted.split_once(',').unwrap();
    assert_eq!(bucket, TEST_BUCKET);
    assert!(key.starts_with("landscape/"), "{}", key);
    assert!(key.ends_with(".mp4"), "{}", key);

    // returned as a presigned URL for the same object
    let body: serde_json::Value = response.json();
    let url = body["video_url"].as_str().unwrap();
    assert!(url.starts_with(&format!("{}/{}", TEST_BASE_URL, key)), "{}", url);
    assert!(url.contains("expires=300"), "{}", url);

    let stored = app.storage.fetch_url(url).await.unwrap();
    assert!(stored.data.starts_with(FASTSTART_MARKER));
    assert!(stored.data.ends_with(MP4));
    assert_eq!(stored.content_type, "video/mp4");

    assert_eq!(app.transcoder.calls(), 1);
    assert!(app.probe.seen()[0].starts_with(app.upload_dir.path()));
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_portrait_video_with_public_strategy() {
    let app = setup_test_app_with(TestOptions {
        video_strategy: StorageStrategy::Public,
        ..with_geometry(1080, 1920)
    })
    .await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let response = upload(&app, &user, video.id).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let keys = app.storage.keys().await;
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("portrait/"), "{}", keys[0]);
    let stored = app.storage.object(&keys[0]).await.unwrap();
    assert!(stored.data.starts_with(FASTSTART_MARKER));
    assert_eq!(stored.content_type, "video/mp4");

    let record = app.stored_video(video.id).await;
    let expected = format!("{}/{}", TEST_BASE_URL, keys[0]);
    assert_eq!(record.video_url.as_deref(), Some(expected.as_str()));

    let body: serde_json::Value = response.json();
    assert_eq!(body["video_url"], expected.as_str());
}

#[tokio::test]
async fn test_square_video_goes_under_other() {
    let app = setup_test_app_with(with_geometry(800, 800)).await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let response = upload(&app, &user, video.id).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let keys = app.storage.keys().await;
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("other/"), "{}", keys[0]);
}

#[tokio::test]
async fn test_webm_is_rejected_before_probing() {
    let app = setup_test_app().await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let response = app
        .client()
        .put(&format!("/api/video_upload/{}", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(video_form(b"\x1aE\xdf\xa3webm", "video/webm"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_MEDIA_TYPE");
    assert!(app.probe.seen().is_empty());
    assert!(app.storage.keys().await.is_empty());
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_probe_failure_cleans_up() {
    let app = setup_test_app_with(TestOptions {
        fail_probe: true,
        ..TestOptions::default()
    })
    .await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let response = upload(&app, &user, video.id).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PROBE_FAILED");
    assert_eq!(app.probe.seen().len(), 1);
    assert_eq!(app.transcoder.calls(), 0);
    assert!(app.storage.keys().await.is_empty());
    assert_eq!(app.staged_files(), 0);
    assert_eq!(app.stored_video(video.id).await, video);
}

#[tokio::test]
async fn test_zero_dimensions_are_rejected() {
    let app = setup_test_app_with(with_geometry(0, 1080)).await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let response = upload(&app, &user, video.id).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_DIMENSIONS");
    assert_eq!(app.transcoder.calls(), 0);
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_transcode_failure_cleans_up() {
    let app = setup_test_app_with(TestOptions {
        fail_transcode: true,
        ..TestOptions::default()
    })
    .await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let response = upload(&app, &user, video.id).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "TRANSCODE_FAILED");
    assert!(app.storage.keys().await.is_empty());
    assert_eq!(app.staged_files(), 0);
    assert!(app.stored_video(video.id).await.video_url.is_none());
}

#[tokio::test]
async fn test_storage_failure_cleans_up() {
    let app = setup_test_app_with(TestOptions {
        fail_storage_puts: true,
        ..TestOptions::default()
    })
    .await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let response = upload(&app, &user, video.id).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.transcoder.calls(), 1);
    assert_eq!(app.staged_files(), 0);
    assert!(app.stored_video(video.id).await.video_url.is_none());
}

#[tokio::test]
async fn test_metadata_failure_discards_stored_video() {
    let app = setup_test_app_with(TestOptions {
        fail_updates: true,
        ..TestOptions::default()
    })
    .await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    let response = upload(&app, &user, video.id).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "DATABASE_ERROR");
    assert!(app.wait_for_object_count(0).await.is_empty());
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_non_owner_upload_never_reaches_the_probe() {
    let app = setup_test_app().await;
    let owner = TestUser::new();
    let intruder = TestUser::new();
    let video = app.seed_video(owner.user_id).await;

    let response = upload(&app, &intruder, video.id).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(app.probe.seen().is_empty());
    assert_eq!(app.stored_video(video.id).await, video);
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_second_upload_replaces_reference() {
    let app = setup_test_app().await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    assert_eq!(upload(&app, &user, video.id).await.status_code(), StatusCode::OK);
    let first = app.stored_video(video.id).await.video_url.unwrap();

    assert_eq!(upload(&app, &user, video.id).await.status_code(), StatusCode::OK);
    let second = app.stored_video(video.id).await.video_url.unwrap();

    assert_ne!(first, second);
    assert_eq!(app.storage.keys().await.len(), 2);
}

#[tokio::test]
async fn test_concurrent_thumbnail_and_video_uploads_keep_both_references() {
    let app = setup_test_app_with(TestOptions {
        probe_delay: Some(std::time::Duration::from_millis(100)),
        ..TestOptions::default()
    })
    .await;
    let user = TestUser::new();
    let video = app.seed_video(user.user_id).await;

    // the video run reads the record, then sits in the probe while the
    // thumbnail run commits
    let thumbnail = Part::bytes(Bytes::from_static(b"\x89PNG\r\n\x1a\nthumb"))
        .file_name("thumb.png")
        .mime_type("image/png");
    let thumbnail_upload = app
        .client()
        .put(&format!("/api/thumbnail_upload/{}", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(MultipartForm::new().add_part("thumbnail", thumbnail));
    let (video_response, thumbnail_response) =
        tokio::join!(upload(&app, &user, video.id), async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            thumbnail_upload.await
        });

    assert_eq!(video_response.status_code(), StatusCode::OK);
    assert_eq!(thumbnail_response.status_code(), StatusCode::OK);

    let record = app.stored_video(video.id).await;
    let thumbnail_url = record.thumbnail_url.expect("thumbnail reference lost");
    assert!(thumbnail_url.ends_with(".png"), "{}", thumbnail_url);
    let video_url = record.video_url.expect("video reference lost");
    assert!(video_url.starts_with(TEST_BUCKET), "{}", video_url);
    assert_eq!(record.title, video.title);

    // the video response carries the thumbnail written while it was probing
    let body: serde_json::Value = video_response.json();
    assert_eq!(body["thumbnail_url"], thumbnail_url.as_str());
}
