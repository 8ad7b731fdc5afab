//! Shared key layout for storage backends.
//!
//! Key format: `{prefix}{name}.{extension}` where `prefix` is empty or ends in `/`.

use crate::traits::{StorageError, StorageResult};

/// Build an object key from a namespace prefix, a random name and an extension.
pub fn object_key(prefix: &str, name: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        format!("{}{}", prefix, name)
    } else {
        format!("{}{}.{}", prefix, name, extension)
    }
}

/// Reject keys that could escape a bucket or directory root.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
