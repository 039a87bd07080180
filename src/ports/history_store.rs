//! History Store Port - durable persistence for session snapshots.
//!
//! The store holds the whole history list as one record, mirroring how the
//! engine writes it: re-serialized in full on every state change after a
//! session has started.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::session::HistoryItem;

/// Errors raised by history persistence.
#[derive(Debug, Error)]
pub enum HistoryStoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to serialize history: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize history: {0}")]
    DeserializationFailed(String),
}

/// Port for loading and saving the session history list.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Loads every saved session snapshot.
    ///
    /// An empty backing record yields an empty list, not an error.
    async fn load_all(&self) -> Result<Vec<HistoryItem>, HistoryStoreError>;

    /// Replaces the saved list with `items`.
    async fn save_all(&self, items: &[HistoryItem]) -> Result<(), HistoryStoreError>;
}
