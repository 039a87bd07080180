//! In-memory History Store for tests and ephemeral runs.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::session::HistoryItem;
use crate::ports::{HistoryStore, HistoryStoreError};

/// Non-durable store holding the list behind a mutex.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    items: Mutex<Vec<HistoryItem>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn load_all(&self) -> Result<Vec<HistoryItem>, HistoryStoreError> {
        Ok(self.items.lock().expect("history lock poisoned").clone())
    }

    async fn save_all(&self, items: &[HistoryItem]) -> Result<(), HistoryStoreError> {
        *self.items.lock().expect("history lock poisoned") = items.to_vec();
        Ok(())
    }
}
