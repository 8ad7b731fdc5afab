//! Ownership guard

use tubely_core::models::VideoRecord;
use tubely_core::AppError;
use tubely_db::VideoRepository;
use uuid::Uuid;

/// Load `video_id` and confirm `caller` owns it.
///
/// A missing record is reported as `Unauthorized`, the same as a foreign one,
/// so callers cannot probe for ids they do not own.
#[tracing::instrument(skip_all, fields(video_id = %video_id, user_id = %caller))]
pub async fn ensure_owner(
    repository: &dyn VideoRepository,
    caller: Uuid,
    video_id: Uuid,
) -> Result<VideoRecord, AppError> {
    let video = repository
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Couldn't find video".to_string()))?;

    if !video.is_owned_by(caller) {
        return Err(AppError::Unauthorized(
            "You are not the owner of this video".to_string(),
        ));
    }

    Ok(video)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubely_db::InMemoryVideoRepository;

    #[tokio::test]
    async fn test_owner_passes_others_fail() {
        let repo = InMemoryVideoRepository::new();
        let owner = Uuid::new_v4();
        let video = VideoRecord::new(owner, "Title", "Description");
        repo.create_video(&video).await.unwrap();

        let loaded = ensure_owner(&repo, owner, video.id).await.unwrap();
        assert_eq!(loaded.id, video.id);

        let err = ensure_owner(&repo, Uuid::new_v4(), video.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_missing_video_is_unauthorized() {
        let repo = InMemoryVideoRepository::new();
        let err = ensure_owner(&repo, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
