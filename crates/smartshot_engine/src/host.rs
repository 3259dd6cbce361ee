//! Interfaces to the host browser's extension runtime. The engine never
//! reimplements these services; it only calls into them.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};

/// Failure reported by a host collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HostError(pub String);

/// The currently focused tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabContext {
    pub title: String,
    pub url: String,
}

/// Encoding requested from the surface capture service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
}

/// What the host should do when the target filename already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Auto-rename rather than overwrite.
    Uniquify,
    Overwrite,
}

/// A file-save request handed to the host's download manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub data: Vec<u8>,
    pub filename: String,
    pub conflict: ConflictPolicy,
    /// Whether to prompt the user for a save location.
    pub prompt: bool,
}

/// Query and capture services for the visible surface.
#[async_trait]
pub trait SurfaceHost: Send + Sync {
    /// Currently focused tab, or `None` when no surface is active.
    async fn active_tab(&self) -> Option<TabContext>;

    /// Renders the active surface to an encoded image. `None` on failure.
    async fn capture_visible(&self, format: ImageFormat) -> Option<Vec<u8>>;

    /// Persists a file without prompting for a location.
    async fn save(&self, request: SaveRequest) -> Result<(), HostError>;
}

pub type DownloadId = u64;

/// State reported by a download state-change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    InProgress,
    Complete,
    Interrupted,
}

/// One host-emitted state-change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub id: DownloadId,
    pub state: DownloadState,
}

/// Payload of a download-created event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadEvent {
    pub id: DownloadId,
    pub url: String,
    pub filename: Option<String>,
    pub mime: Option<String>,
    pub file_size: Option<u64>,
}

/// Fields the terminal-state lookup can supply on top of the original
/// download-created event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadDetails {
    pub filename: Option<String>,
    pub file_size: Option<u64>,
    pub mime: Option<String>,
}

/// The host's download manager.
#[async_trait]
pub trait DownloadHost: Send + Sync {
    /// Subscribes to download state-change events. Each tracked download
    /// holds its own receiver; dropping it tears the subscription down.
    fn state_changes(&self) -> broadcast::Receiver<StateChange>;

    /// Full record for a download id, or `None` when the host no longer
    /// knows it.
    async fn lookup(&self, id: DownloadId) -> Result<Option<DownloadDetails>, HostError>;
}

/// The host's persistent key-value store. Writes are all-or-nothing per
/// call; there are no partial or row-level updates.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, HostError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), HostError>;
}

/// In-memory key-value store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, HostError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), HostError> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}
