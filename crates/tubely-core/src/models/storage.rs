use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::THUMBNAIL_ROUTE_PREFIX;

/// Where a stored file lives. Exactly one representation is active per reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageReference {
    Object { bucket: String, key: String },
    Embedded { data: Vec<u8>, content_type: String },
    Cached { video_id: Uuid },
}

impl StorageReference {
    /// `{bucket},{key}`, the form persisted when URLs are signed at read time.
    ///
    /// Returns `None` for references that are not object-store backed.
    pub fn to_signed_form(&self) -> Option<String> {
        match self {
            StorageReference::Object { bucket, key } => Some(format!("{},{}", bucket, key)),
            _ => None,
        }
    }

    /// Parse a persisted `{bucket},{key}` pair. The bucket is everything before the
    /// first comma.
    pub fn from_signed_form(value: &str) -> Option<Self> {
        let (bucket, key) = value.split_once(',')?;
        if bucket.is_empty() || key.is_empty() {
            return None;
        }
        Some(StorageReference::Object {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    /// `data:{content_type};base64,{payload}` for embedded references.
    pub fn to_data_uri(&self) -> Option<String> {
        match self {
            StorageReference::Embedded { data, content_type } => Some(format!(
                "data:{};base64,{}",
                content_type,
                STANDARD.encode(data)
            )),
            _ => None,
        }
    }

    /// Decode a base64 `data:` URI back into an embedded reference.
    pub fn from_data_uri(value: &str) -> Option<Self> {
        let rest = value.strip_prefix("data:")?;
        let (content_type, payload) = rest.split_once(";base64,")?;
        let data = STANDARD.decode(payload).ok()?;
        Some(StorageReference::Embedded {
            data,
            content_type: content_type.to_string(),
        })
    }

    /// API path serving a cached thumbnail.
    pub fn to_cache_path(&self) -> Option<String> {
        match self {
            StorageReference::Cached { video_id } => {
                Some(format!("{}/{}", THUMBNAIL_ROUTE_PREFIX, video_id))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_form_splits_on_first_comma() {
        let reference = StorageReference::from_signed_form("tubely-media,landscape/a,b.mp4")
            .expect("valid pair");
        assert_eq!(
            reference,
            StorageReference::Object {
                bucket: "tubely-media".to_string(),
                key: "landscape/a,b.mp4".to_string(),
            }
        );
    }

    #[test]
    fn test_signed_form_rejects_plain_urls() {
        assert!(StorageReference::from_signed_form("https://example.com/video.mp4").is_none());
        assert!(StorageReference::from_signed_form(",key.mp4").is_none());
        assert!(StorageReference::from_signed_form("bucket,").is_none());
    }

    #[test]
    fn test_data_uri_decodes_to_original_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let reference = StorageReference::Embedded {
            data: bytes.clone(),
            content_type: "image/png".to_string(),
        };
        let uri = reference.to_data_uri().unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        match StorageReference::from_data_uri(&uri) {
            Some(StorageReference::Embedded { data, content_type }) => {
                assert_eq!(data, bytes);
                assert_eq!(content_type, "image/png");
            }
            other => panic!("unexpected reference: {:?}", other),
        }
    }

    #[test]
    fn test_cache_path() {
        let id = Uuid::new_v4();
        let reference = StorageReference::Cached { video_id: id };
        assert_eq!(
            reference.to_cache_path().unwrap(),
            format!("/api/thumbnails/{}", id)
        );
        assert!(reference.to_signed_form().is_none());
    }
}
