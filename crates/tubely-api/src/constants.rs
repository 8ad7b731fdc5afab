//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Headroom above a file-size limit for multipart framing and other form fields.
pub const BODY_LIMIT_SLACK_BYTES: usize = 1 << 20;

/// Default cap on in-flight requests (override with `HTTP_CONCURRENCY_LIMIT`).
pub const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 10_000;
