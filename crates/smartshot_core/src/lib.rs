//! SmartShot core: record normalization, classification, and reconciliation.
mod classify;
mod cleanup;
mod dedupe;
mod display;
mod filename;
mod reconcile;
mod record;
mod search;

pub use classify::{is_screenshot, is_usable_link};
pub use cleanup::{cleanup_retain, CleanupConfig};
pub use dedupe::{dedup_key, dedupe};
pub use display::{display_name, format_date, format_time, ViewKind};
pub use filename::{capture_filename, resolve_download_filename};
pub use reconcile::{passes_validity, reconcile, ClassifiedView, ReconcileConfig};
pub use record::{
    DownloadRecord, DownloadStatus, HistoryItem, RawRecord, TimestampValue,
};
pub use search::{matches_query, view_stats, SearchField, ViewStats};
