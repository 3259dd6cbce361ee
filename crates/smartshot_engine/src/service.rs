use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use shot_logging::{shot_error, shot_info, shot_warn};
use smartshot_core::{reconcile, ClassifiedView, CleanupConfig, ReconcileConfig};

use crate::capture::{capture_active_surface, SCREENSHOT_COMMAND};
use crate::error::{CaptureError, StoreError};
use crate::host::{DownloadEvent, DownloadHost, KeyValueStore, SurfaceHost};
use crate::messages;
use crate::notes::NoteStore;
use crate::store::HistoryStore;
use crate::assemble::assemble_record;
use crate::tracker::{await_terminal, DEFAULT_TRACK_TIMEOUT};

/// The engine facade: wires the host collaborators to the capture flow,
/// the download lifecycle tracker, and the persistent stores.
pub struct SmartShot {
    surface: Arc<dyn SurfaceHost>,
    downloads: Arc<dyn DownloadHost>,
    history: HistoryStore,
    notes: NoteStore,
    reconcile_config: ReconcileConfig,
    track_timeout: Duration,
}

impl SmartShot {
    pub fn new(
        surface: Arc<dyn SurfaceHost>,
        downloads: Arc<dyn DownloadHost>,
        kv: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            surface,
            downloads,
            history: HistoryStore::new(Arc::clone(&kv)),
            notes: NoteStore::new(kv),
            reconcile_config: ReconcileConfig::default(),
            track_timeout: DEFAULT_TRACK_TIMEOUT,
        }
    }

    /// Shortens the terminal-state wait, mainly for tests.
    pub fn with_track_timeout(mut self, timeout: Duration) -> Self {
        self.track_timeout = timeout;
        self
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    /// Install-time setup: empty history and default settings.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        self.history.initialize().await
    }

    /// Reacts to a named host command. Only the screenshot command is
    /// recognized; anything else is ignored.
    pub async fn handle_command(&self, command: &str) {
        if command != SCREENSHOT_COMMAND {
            return;
        }
        match capture_active_surface(self.surface.as_ref(), Utc::now()).await {
            Ok(filename) => shot_info!("Captured screenshot {filename}"),
            Err(CaptureError::NoActiveSurface) => {
                shot_warn!("Screenshot command with no active surface")
            }
            Err(err) => shot_error!("Screenshot capture failed: {err}"),
        }
    }

    /// Tracks a newly created download to its terminal state and records
    /// it in history. Lookup failures degrade to the original event's
    /// fields rather than losing the record.
    pub async fn handle_download_created(&self, event: DownloadEvent) {
        // Subscribe before waiting so a fast completion cannot slip past.
        let receiver = self.downloads.state_changes();
        let status = await_terminal(receiver, event.id, self.track_timeout).await;

        let details = match self.downloads.lookup(event.id).await {
            Ok(details) => details,
            Err(err) => {
                shot_warn!("Lookup for download {} failed: {err}", event.id);
                None
            }
        };
        let tab = self.surface.active_tab().await;

        let record = assemble_record(&event, status, details.as_ref(), tab.as_ref(), Utc::now());
        shot_info!("Download {} finished as {}", record.id, record.status);
        if let Err(err) = self.history.append(&record).await {
            shot_error!("Failed to record download {}: {err}", record.id);
        }
    }

    /// Loads every storage bucket and reconciles it into the two display
    /// partitions.
    pub async fn classified_view(&self) -> Result<ClassifiedView, StoreError> {
        let sources = self.history.load_sources().await?;
        Ok(reconcile(&sources, &self.reconcile_config, Utc::now()))
    }

    /// Maintenance cleanup over the primary history list.
    pub async fn run_cleanup(&self, config: &CleanupConfig) -> Result<usize, StoreError> {
        self.history.run_cleanup(config, Utc::now()).await
    }

    /// Answers one UI request.
    pub async fn handle_message(&self, request: &Value) -> Value {
        messages::handle_message(&self.history, request).await
    }
}
