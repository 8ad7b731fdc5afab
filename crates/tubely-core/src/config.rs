//! Configuration module
//!
//! Settings are read from the environment (optionally seeded from a `.env` file)
//! into typed structs once at startup.

use std::env;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_THUMBNAIL_CONTENT_TYPES, DEFAULT_VIDEO_CONTENT_TYPES, MAX_THUMBNAIL_SIZE_BYTES,
    MAX_VIDEO_SIZE_BYTES, SIGNED_URL_TTL_SECS,
};
use crate::storage_types::{StorageBackend, StorageStrategy};

const DEFAULT_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub jwt_secret: String,
    pub log_format: String,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            jwt_secret: String::new(),
            log_format: "compact".to_string(),
        }
    }
}

/// Upload pipeline configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base: BaseConfig,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Storage
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub assets_root: PathBuf,
    pub assets_base_url: String,
    pub thumbnail_strategy: StorageStrategy,
    pub video_strategy: StorageStrategy,
    pub signed_url_ttl_secs: u64,
    // Media
    pub upload_temp_dir: PathBuf,
    pub max_video_size_bytes: usize,
    pub max_thumbnail_size_bytes: usize,
    pub video_allowed_content_types: Vec<String>,
    pub thumbnail_allowed_content_types: Vec<String>,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig::default(),
            database_url: None,
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            storage_backend: StorageBackend::S3,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            assets_root: PathBuf::from("./assets"),
            assets_base_url: format!("http://localhost:{}/assets", DEFAULT_PORT),
            thumbnail_strategy: StorageStrategy::Public,
            video_strategy: StorageStrategy::Signed,
            signed_url_ttl_secs: SIGNED_URL_TTL_SECS,
            upload_temp_dir: env::temp_dir(),
            max_video_size_bytes: MAX_VIDEO_SIZE_BYTES,
            max_thumbnail_size_bytes: MAX_THUMBNAIL_SIZE_BYTES,
            video_allowed_content_types: to_owned_list(DEFAULT_VIDEO_CONTENT_TYPES),
            thumbnail_allowed_content_types: to_owned_list(DEFAULT_THUMBNAIL_CONTENT_TYPES),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    /// Load configuration from the environment and validate it
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = Config(Box::new(ServiceConfig::from_env()?));
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.0.validate()
    }

    pub fn inner(&self) -> &ServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.0.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.0.base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.0.base.environment
    }

    pub fn jwt_secret(&self) -> &str {
        &self.0.base.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.0.base.cors_origins
    }

    pub fn log_format(&self) -> &str {
        &self.0.base.log_format
    }

    pub fn database_url(&self) -> Option<&str> {
        self.0.database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.0.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.0.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.0.storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.0.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.0.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.0.s3_endpoint.as_deref()
    }

    pub fn assets_root(&self) -> &std::path::Path {
        &self.0.assets_root
    }

    pub fn assets_base_url(&self) -> &str {
        &self.0.assets_base_url
    }

    pub fn thumbnail_strategy(&self) -> StorageStrategy {
        self.0.thumbnail_strategy
    }

    pub fn video_strategy(&self) -> StorageStrategy {
        self.0.video_strategy
    }

    pub fn signed_url_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.0.signed_url_ttl_secs)
    }

    pub fn upload_temp_dir(&self) -> &std::path::Path {
        &self.0.upload_temp_dir
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.0.max_video_size_bytes
    }

    pub fn max_thumbnail_size_bytes(&self) -> usize {
        self.0.max_thumbnail_size_bytes
    }

    pub fn video_allowed_content_types(&self) -> &[String] {
        &self.0.video_allowed_content_types
    }

    pub fn thumbnail_allowed_content_types(&self) -> &[String] {
        &self.0.thumbnail_allowed_content_types
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.0.ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.0.ffprobe_path
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = ServiceConfig::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let base = BaseConfig {
            server_port,
            cors_origins,
            environment,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "compact".to_string())
                .to_lowercase(),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.storage_backend,
        };
        let thumbnail_strategy = match env::var("THUMBNAIL_STORAGE_STRATEGY") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.thumbnail_strategy,
        };
        let video_strategy = match env::var("VIDEO_STORAGE_STRATEGY") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.video_strategy,
        };

        Ok(ServiceConfig {
            base,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").or_else(|_| env::var("AWS_REGION")).ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            assets_root: env::var("ASSETS_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.assets_root),
            assets_base_url: env::var("ASSETS_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}/assets", server_port)),
            thumbnail_strategy,
            video_strategy,
            signed_url_ttl_secs: env::var("SIGNED_URL_TTL_SECS")
                .unwrap_or_else(|_| SIGNED_URL_TTL_SECS.to_string())
                .parse()
                .unwrap_or(SIGNED_URL_TTL_SECS),
            upload_temp_dir: env::var("UPLOAD_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_temp_dir),
            max_video_size_bytes: size_from_env("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_BYTES),
            max_thumbnail_size_bytes: size_from_env(
                "MAX_THUMBNAIL_SIZE_MB",
                MAX_THUMBNAIL_SIZE_BYTES,
            ),
            video_allowed_content_types: list_from_env(
                "VIDEO_ALLOWED_CONTENT_TYPES",
                DEFAULT_VIDEO_CONTENT_TYPES,
            ),
            thumbnail_allowed_content_types: list_from_env(
                "THUMBNAIL_ALLOWED_CONTENT_TYPES",
                DEFAULT_THUMBNAIL_CONTENT_TYPES,
            ),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or(defaults.ffprobe_path),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if !self.video_strategy.uses_object_store() {
            return Err(anyhow::anyhow!(
                "VIDEO_STORAGE_STRATEGY must be 'public' or 'signed', got '{}'",
                self.video_strategy
            ));
        }

        if self.storage_backend == StorageBackend::S3 {
            if self.s3_bucket.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_BUCKET must be set when using S3 storage backend"
                ));
            }
            if self.s3_region.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                ));
            }
        }

        if self.max_video_size_bytes == 0 || self.max_thumbnail_size_bytes == 0 {
            return Err(anyhow::anyhow!("Upload size limits must be greater than zero"));
        }

        Ok(())
    }
}

fn size_from_env(key: &str, default_bytes: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .map(|mb| mb * 1024 * 1024)
        .unwrap_or(default_bytes)
}

fn list_from_env(key: &str, default: &[&str]) -> Vec<String> {
    match env::var(key) {
        Ok(value) => value
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(_) => to_owned_list(default),
    }
}

fn to_owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ServiceConfig {
        ServiceConfig {
            base: BaseConfig {
                jwt_secret: "a".repeat(32),
                ..BaseConfig::default()
            },
            storage_backend: StorageBackend::Memory,
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn test_defaults_match_upload_limits() {
        let config = ServiceConfig::default();
        assert_eq!(config.max_video_size_bytes, 1024 * 1024 * 1024);
        assert_eq!(config.max_thumbnail_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.signed_url_ttl_secs, 300);
        assert_eq!(
            config.thumbnail_allowed_content_types,
            vec!["image/jpeg", "image/png"]
        );
        assert_eq!(config.video_allowed_content_types, vec!["video/mp4"]);
    }

    #[test]
    fn test_validate_accepts_memory_backend() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let mut config = valid_config();
        config.base.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inline_video_strategies() {
        for strategy in [StorageStrategy::Embedded, StorageStrategy::Cache] {
            let mut config = valid_config();
            config.video_strategy = strategy;
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("VIDEO_STORAGE_STRATEGY"));
        }
    }

    #[test]
    fn test_validate_requires_bucket_for_s3() {
        let mut config = valid_config();
        config.storage_backend = StorageBackend::S3;
        config.s3_region = Some("us-east-1".to_string());
        assert!(config.validate().is_err());

        config.s3_bucket = Some("tubely-media".to_string());
        assert!(config.validate().is_ok());
    }
}
