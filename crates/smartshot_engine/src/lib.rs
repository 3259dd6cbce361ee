//! SmartShot engine: host collaborators, capture flow, download tracking,
//! and the persistent stores behind the history views.
mod assemble;
mod capture;
mod error;
mod host;
mod messages;
mod notes;
mod service;
mod store;
mod tracker;

pub use assemble::assemble_record;
pub use capture::{capture_active_surface, SCREENSHOT_COMMAND};
pub use error::{CaptureError, StoreError};
pub use host::{
    ConflictPolicy, DownloadDetails, DownloadEvent, DownloadHost, DownloadId, DownloadState,
    HostError, ImageFormat, KeyValueStore, MemoryStore, SaveRequest, StateChange, SurfaceHost,
    TabContext,
};
pub use messages::handle_message;
pub use notes::{NoteStore, NOTES_KEY};
pub use service::SmartShot;
pub use store::{
    HistoryStore, Settings, HISTORY_KEY, LEGACY_KEYS, MAX_HISTORY_ITEMS, SETTINGS_KEY,
};
pub use tracker::{await_terminal, DEFAULT_TRACK_TIMEOUT};
