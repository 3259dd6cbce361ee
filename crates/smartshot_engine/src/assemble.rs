use chrono::{DateTime, Utc};
use smartshot_core::{resolve_download_filename, DownloadRecord, DownloadStatus};

use crate::host::{DownloadDetails, DownloadEvent, TabContext};

/// Placeholder when the originating tab context is unavailable.
const UNKNOWN_CONTEXT: &str = "Unknown";

/// Builds the retained record for a download that reached its terminal
/// state. Filename resolution prefers the host-reported final name, then
/// the original event's name, then a name derived from the URL; size and
/// MIME fall back from the terminal-state lookup to the original event.
pub fn assemble_record(
    event: &DownloadEvent,
    status: DownloadStatus,
    details: Option<&DownloadDetails>,
    tab: Option<&TabContext>,
    now: DateTime<Utc>,
) -> DownloadRecord {
    let tab_title = tab
        .map(|t| t.title.clone())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNKNOWN_CONTEXT.to_string());
    let tab_url = tab
        .map(|t| t.url.clone())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| UNKNOWN_CONTEXT.to_string());

    let final_name = details.and_then(|d| d.filename.as_deref());
    let mime = details
        .and_then(|d| d.mime.clone())
        .or_else(|| event.mime.clone());

    let filename = resolve_download_filename(
        final_name,
        event.filename.as_deref(),
        &event.url,
        mime.as_deref(),
        Some(tab_url.as_str()),
        now,
    );
    let file_path = final_name
        .or(event.filename.as_deref())
        .map(str::to_string);
    let file_size = details.and_then(|d| d.file_size).or(event.file_size);

    DownloadRecord {
        id: event.id.to_string(),
        filename,
        file_path,
        original_url: event.url.clone(),
        download_url: event.url.clone(),
        tab_title,
        tab_url,
        timestamp: now.timestamp_millis(),
        status,
        file_size,
        mime,
    }
}
