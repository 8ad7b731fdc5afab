use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailEntry {
    pub data: Bytes,
    pub content_type: String,
}

/// Thumbnails held in process memory, keyed by video id.
///
/// Entries are replaced whole under the write lock, so a reader sees either the
/// previous entry or the new one. Contents are lost when the process exits.
#[derive(Clone, Default)]
pub struct ThumbnailCache {
    entries: Arc<RwLock<HashMap<Uuid, ThumbnailEntry>>>,
}

impl ThumbnailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, video_id: Uuid, entry: ThumbnailEntry) {
        self.entries.write().await.insert(video_id, entry);
    }

    pub async fn get(&self, video_id: Uuid) -> Option<ThumbnailEntry> {
        self.entries.read().await.get(&video_id).cloned()
    }

    pub async fn remove(&self, video_id: Uuid) -> Option<ThumbnailEntry> {
        self.entries.write().await.remove(&video_id)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
