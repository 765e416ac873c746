//! Persistence contract: chat records and the store trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conversation::Conversation;
use crate::turn::Turn;

/// Maximum length, in characters, of a record title derived from the first
/// turn's content
pub const TITLE_MAX_CHARS: usize = 100;

/// A finalized conversation, as handed to the persistence service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: String,
    pub title: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub turns: Vec<Turn>,
    pub path: String,
}

impl ChatRecord {
    /// Build a record from a conversation for the given owner.
    ///
    /// The title is the first turn's content truncated to
    /// [`TITLE_MAX_CHARS`] characters; the path follows the `/chat/{id}`
    /// routing convention.
    pub fn from_conversation(conversation: &Conversation, owner_id: impl Into<String>) -> Self {
        let title = conversation
            .turns()
            .first()
            .map(|turn| turn.text().chars().take(TITLE_MAX_CHARS).collect())
            .unwrap_or_default();

        Self {
            id: conversation.id().to_string(),
            title,
            owner_id: owner_id.into(),
            created_at: Utc::now(),
            turns: conversation.turns().to_vec(),
            path: format!("/chat/{}", conversation.id()),
        }
    }
}

/// Errors from the persistence service. AI state is never affected by a
/// store failure; every operation is safe to retry.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record not found: {0}")]
    NotFound(String),
}

/// Durable storage for finalized conversation records
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Save (or overwrite) a record
    async fn save(&self, record: &ChatRecord) -> Result<(), StoreError>;

    /// Load all records owned by a user, newest first
    async fn load(&self, owner_id: &str) -> Result<Vec<ChatRecord>, StoreError>;

    /// Remove one record by id
    async fn remove(&self, id: &str) -> Result<(), StoreError>;

    /// Remove all records owned by a user
    async fn clear(&self, owner_id: &str) -> Result<(), StoreError>;
}
