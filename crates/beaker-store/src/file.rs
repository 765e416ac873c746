//! File-backed chat store: one JSON file per record

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use beaker_chat::{ChatRecord, ChatStore, StoreError};

/// Stores each record as `{root}/{id}.json`.
///
/// Records are self-describing, so listing a user's chats is a directory
/// scan plus an owner filter. Unreadable files are skipped with a warning
/// rather than failing the whole listing.
pub struct FileChatStore {
    root: PathBuf,
}

impl FileChatStore {
    /// Create a store rooted at the given directory. The directory is
    /// created lazily on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The platform-appropriate default storage directory
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("beaker")
            .join("chats")
    }

    /// The directory this store reads and writes
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }
}

impl Default for FileChatStore {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

#[async_trait]
impl ChatStore for FileChatStore {
    async fn save(&self, record: &ChatRecord) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(self.record_path(&record.id), json).await?;
        tracing::debug!("saved chat {} for {}", record.id, record.owner_id);
        Ok(())
    }

    async fn load(&self, owner_id: &str) -> Result<Vec<ChatRecord>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut records = vec![];
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<ChatRecord>(&bytes) {
                Ok(record) if record.owner_id == owner_id => records.push(record),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("skipping unreadable record {}: {}", path.display(), e);
                }
            }
        }

        // Newest first
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.record_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self, owner_id: &str) -> Result<(), StoreError> {
        for record in self.load(owner_id).await? {
            // A concurrent remove is fine; the record is gone either way
            match self.remove(&record.id).await {
                Ok(()) | Err(StoreError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
