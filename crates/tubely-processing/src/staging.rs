//! Upload staging
//!
//! An inbound body is copied chunk by chunk into a randomly named file in the
//! upload temp directory. The file is owned by a [`StagedArtifact`], which
//! deletes it exactly once: through [`StagedArtifact::release`] on the success
//! path, or on drop when a later stage fails or the request is cancelled.

use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use rand::rngs::OsRng;
use rand::TryRngCore;
use tempfile::{Builder, TempPath};
use tokio::io::AsyncWriteExt;

use crate::error::StagingError;
use crate::validator::{extension_for_content_type, UploadPolicy};

/// Bytes of OS entropy behind every artifact name.
const NAME_ENTROPY_BYTES: usize = 32;

const FILE_PREFIX: &str = "tubely-";

/// A temporary file holding one upload (or a derivative of it).
#[derive(Debug)]
pub struct StagedArtifact {
    path: TempPath,
    name: String,
    content_type: String,
    extension: String,
    len: u64,
}

impl StagedArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Random, URL-safe name shared with derived artifacts and object keys.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the whole artifact into memory.
    pub async fn read(&self) -> io::Result<Bytes> {
        Ok(Bytes::from(tokio::fs::read(&self.path).await?))
    }

    /// Reserve a sibling file for a derivative of this artifact (e.g. a remux).
    ///
    /// The new file lives next to this one and carries the same name, content
    /// type and extension; `label` only distinguishes it on disk.
    pub fn derive(&self, label: &str) -> Result<PendingArtifact, StagingError> {
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);
        let path = Builder::new()
            .prefix(&format!("{}{}-{}", FILE_PREFIX, self.name, label))
            .suffix(&format!(".{}", self.extension))
            .rand_bytes(0)
            .tempfile_in(dir)?
            .into_temp_path();

        Ok(PendingArtifact {
            path,
            name: self.name.clone(),
            content_type: self.content_type.clone(),
            extension: self.extension.clone(),
        })
    }

    /// Delete the file now and report the outcome.
    pub fn release(self) -> io::Result<()> {
        let path = self.path.to_path_buf();
        self.path.close()?;
        tracing::debug!(path = %path.display(), "Released staged artifact");
        Ok(())
    }
}

/// A reserved, still-empty output file. Dropping it deletes the file.
#[derive(Debug)]
pub struct PendingArtifact {
    path: TempPath,
    name: String,
    content_type: String,
    extension: String,
}

impl PendingArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Turn the written output into a staged artifact.
    pub async fn finish(self) -> Result<StagedArtifact, StagingError> {
        let len = tokio::fs::metadata(&self.path).await?.len();
        if len == 0 {
            return Err(StagingError::EmptyFile);
        }
        Ok(StagedArtifact {
            path: self.path,
            name: self.name,
            content_type: self.content_type,
            extension: self.extension,
            len,
        })
    }
}

/// Drains upload bodies into [`StagedArtifact`]s under a temp directory.
#[derive(Debug, Clone)]
pub struct UploadStager {
    temp_dir: PathBuf,
}

impl UploadStager {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Validate the declared content type, then copy `body` to a new artifact.
    ///
    /// Nothing touches the disk when the content type is rejected. The size
    /// limit is enforced while copying, so an oversized body is abandoned as
    /// soon as it crosses `policy.max_bytes`.
    #[tracing::instrument(skip(self, body, policy), fields(max_bytes = policy.max_bytes))]
    pub async fn stage<S, E>(
        &self,
        declared_content_type: Option<&str>,
        body: S,
        policy: &UploadPolicy,
    ) -> Result<StagedArtifact, StagingError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let content_type = policy.validate_content_type(declared_content_type)?;
        let extension = extension_for_content_type(&content_type);
        let name = random_name()?;

        let (file, path) = Builder::new()
            .prefix(&format!("{}{}", FILE_PREFIX, name))
            .suffix(&format!(".{}", extension))
            .rand_bytes(0)
            .tempfile_in(&self.temp_dir)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let start = std::time::Instant::now();
        let mut body = std::pin::pin!(body);
        let mut written: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| StagingError::Stream(e.to_string()))?;
            written += chunk.len() as u64;
            if written > policy.max_bytes as u64 {
                return Err(StagingError::TooLarge {
                    max: policy.max_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }

        if written == 0 {
            return Err(StagingError::EmptyFile);
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tracing::info!(
            content_type = %content_type,
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload staged"
        );

        Ok(StagedArtifact {
            path,
            name,
            content_type,
            extension,
            len: written,
        })
    }
}

/// 32 bytes from the OS CSPRNG, base64url without padding.
pub fn random_name() -> Result<String, StagingError> {
    let mut bytes = [0u8; NAME_ENTROPY_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| StagingError::Entropy(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
