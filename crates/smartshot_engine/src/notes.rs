use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::host::KeyValueStore;

/// Storage key for the sticky-note mapping.
pub const NOTES_KEY: &str = "stickyNotes";

/// Free-text annotations keyed by record id. Fully independent of the
/// record lifecycle: notes for evicted records are never proactively
/// cleaned (acceptable leak, bounded by what a user realistically writes).
#[derive(Clone)]
pub struct NoteStore {
    kv: Arc<dyn KeyValueStore>,
}

impl NoteStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub async fn note(&self, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .mapping()
            .await?
            .get(id)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Saves a note for `id`. Empty or whitespace-only text deletes the
    /// entry rather than storing an empty string.
    pub async fn set_note(&self, id: &str, text: &str) -> Result<(), StoreError> {
        let mut notes = self.mapping().await?;
        if text.trim().is_empty() {
            notes.remove(id);
        } else {
            notes.insert(id.to_string(), Value::String(text.to_string()));
        }
        self.kv.set(NOTES_KEY, Value::Object(notes)).await?;
        Ok(())
    }

    async fn mapping(&self) -> Result<Map<String, Value>, StoreError> {
        match self.kv.get(NOTES_KEY).await? {
            Some(Value::Object(map)) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}
