use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Where object bytes physically go when a strategy needs an object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// How a finished upload is placed and later addressed by clients.
///
/// One strategy is chosen per deployment for thumbnails and one for videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageStrategy {
    /// Object store, persisted as a direct public URL.
    Public,
    /// Object store, persisted as `{bucket},{key}` and signed on every read.
    Signed,
    /// Inline `data:` URI stored on the record itself.
    Embedded,
    /// Process-local thumbnail cache served by this API.
    Cache,
}

impl StorageStrategy {
    /// Whether the strategy keeps bytes in an object store.
    pub fn uses_object_store(&self) -> bool {
        matches!(self, StorageStrategy::Public | StorageStrategy::Signed)
    }
}

impl FromStr for StorageStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(StorageStrategy::Public),
            "signed" => Ok(StorageStrategy::Signed),
            "embedded" => Ok(StorageStrategy::Embedded),
            "cache" => Ok(StorageStrategy::Cache),
            _ => Err(anyhow::anyhow!("Invalid storage strategy: {}", s)),
        }
    }
}

impl Display for StorageStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageStrategy::Public => write!(f, "public"),
            StorageStrategy::Signed => write!(f, "signed"),
            StorageStrategy::Embedded => write!(f, "embedded"),
            StorageStrategy::Cache => write!(f, "cache"),
        }
    }
}
