use crate::error::StagingError;
use tubely_core::Config;

/// Size and content-type rules applied while staging one kind of upload.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_bytes: usize,
    pub allowed_content_types: Vec<String>,
}

impl UploadPolicy {
    pub fn new(max_bytes: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_bytes,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    pub fn thumbnails(config: &Config) -> Self {
        Self::new(
            config.max_thumbnail_size_bytes(),
            config.thumbnail_allowed_content_types().to_vec(),
        )
    }

    pub fn videos(config: &Config) -> Self {
        Self::new(
            config.max_video_size_bytes(),
            config.video_allowed_content_types().to_vec(),
        )
    }

    /// Check a declared content type against the allow-list.
    ///
    /// Returns the normalized media type on success.
    pub fn validate_content_type(&self, declared: Option<&str>) -> Result<String, StagingError> {
        let declared = declared
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(StagingError::MissingContentType)?;
        let normalized = normalize_content_type(declared);

        if !self.allowed_content_types.iter().any(|ct| ct == &normalized) {
            return Err(StagingError::InvalidMediaType {
                content_type: normalized,
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(normalized)
    }
}

/// Strip parameters (e.g. `; charset=binary`) and lowercase a content type.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// File extension used for object keys of a given media type.
pub fn extension_for_content_type(content_type: &str) -> String {
    match content_type {
        "image/jpeg" => "jpg".to_string(),
        "image/png" => "png".to_string(),
        "video/mp4" => "mp4".to_string(),
        other => other
            .rsplit('/')
            .next()
            .unwrap_or("bin")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>(),
    }
}
