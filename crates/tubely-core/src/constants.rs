//! Limits and fixed values shared across crates.

/// Upper bound for a staged video body (1 GiB).
pub const MAX_VIDEO_SIZE_BYTES: usize = 1 << 30;

/// Upper bound for a staged thumbnail body (10 MiB).
pub const MAX_THUMBNAIL_SIZE_BYTES: usize = 10 << 20;

/// Validity of signed object-store GET URLs.
pub const SIGNED_URL_TTL_SECS: u64 = 5 * 60;

/// Multipart field carrying the thumbnail file.
pub const THUMBNAIL_FIELD: &str = "thumbnail";

/// Multipart field carrying the video file.
pub const VIDEO_FIELD: &str = "video";

/// Content types accepted for thumbnails unless overridden.
pub const DEFAULT_THUMBNAIL_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Content types accepted for videos unless overridden.
pub const DEFAULT_VIDEO_CONTENT_TYPES: &[&str] = &["video/mp4"];

/// Path under which cached thumbnails are served.
pub const THUMBNAIL_ROUTE_PREFIX: &str = "/api/thumbnails";
