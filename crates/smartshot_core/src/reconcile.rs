use chrono::{DateTime, Datelike, Duration, Utc};
use shot_logging::shot_warn;

use crate::classify::{is_screenshot, is_usable_link};
use crate::dedupe::dedupe;
use crate::record::{HistoryItem, RawRecord, TimestampValue};

/// Upper bound on the length of a synthesized identifier.
const SYNTH_ID_MAX_CHARS: usize = 64;

/// Horizons for the download admission gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Oldest acceptable timestamp for a download that carries a usable URL.
    pub recent_horizon: Duration,
    /// Oldest acceptable timestamp for a download without a usable URL.
    pub no_url_horizon: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            recent_horizon: Duration::days(30),
            no_url_horizon: Duration::days(7),
        }
    }
}

/// The two presentation-ready partitions. Derived on every read by
/// rerunning the pipeline over the raw storage snapshot; never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedView {
    pub screenshots: Vec<HistoryItem>,
    pub downloads: Vec<HistoryItem>,
}

/// Runs the full reconciliation pipeline:
/// merge -> validity filter -> dedupe -> classify -> admission hardening
/// -> identity assignment -> sort.
///
/// `sources` are processed in priority order (primary bucket first); the
/// relative order within each source is preserved through dedup, so the
/// first occurrence of a duplicate wins. The function is pure with respect
/// to its input snapshot.
pub fn reconcile(
    sources: &[Vec<RawRecord>],
    config: &ReconcileConfig,
    now: DateTime<Utc>,
) -> ClassifiedView {
    let merged: Vec<RawRecord> = sources.iter().flatten().cloned().collect();
    let valid: Vec<RawRecord> = merged.into_iter().filter(passes_validity).collect();
    let unique = dedupe(valid);

    let mut screenshots = Vec::new();
    let mut downloads = Vec::new();
    for record in unique {
        if is_screenshot(&record) {
            screenshots.push(record);
        } else {
            downloads.push(record);
        }
    }

    let downloads: Vec<RawRecord> = downloads
        .into_iter()
        .filter(|record| admit_download(record, config, now))
        .collect();

    ClassifiedView {
        screenshots: finalize("screenshot_", &screenshots),
        downloads: finalize("download_", &downloads),
    }
}

/// An item must carry at least one of a resolvable filename or a
/// resolvable size to survive; everything else is storage noise.
pub fn passes_validity(record: &RawRecord) -> bool {
    record.resolved_filename().is_some() || record.resolved_size().is_some()
}

/// Plausibility filters applied only to the download partition.
fn admit_download(record: &RawRecord, config: &ReconcileConfig, now: DateTime<Utc>) -> bool {
    if year_mismatch(record) {
        return false;
    }

    let resolved = record.resolved_timestamp();
    if record.has_timestamp() && resolved.is_none() {
        // Present but unresolvable: not a trustworthy record.
        return false;
    }
    if let Some(timestamp) = resolved {
        if timestamp > now {
            return false;
        }
    }

    let usable_url = record
        .resolved_url()
        .map(is_usable_link)
        .unwrap_or(false);
    match (usable_url, resolved) {
        (true, Some(timestamp)) => now - timestamp <= config.recent_horizon,
        // A missing timestamp with a real URL is admitted; it sorts last.
        (true, None) => true,
        (false, Some(timestamp)) => now - timestamp <= config.no_url_horizon,
        (false, None) => false,
    }
}

/// Corruption heuristic: a year token baked into the filename that
/// disagrees with the record's timestamp by more than one year means the
/// record was stitched together from mismatched sources. Dropped with a
/// diagnostic, never fatal.
fn year_mismatch(record: &RawRecord) -> bool {
    let (Some(filename), Some(timestamp)) =
        (record.resolved_filename(), record.resolved_timestamp())
    else {
        return false;
    };
    let Some(name_year) = filename_year(filename) else {
        return false;
    };
    let mismatch = (timestamp.year() - name_year).abs() > 1;
    if mismatch {
        shot_warn!(
            "Dropping corrupted record: filename {filename:?} names year {name_year} \
             but timestamp resolves to {}",
            timestamp.year()
        );
    }
    mismatch
}

/// First `20\d\d` token in the filename, if any.
fn filename_year(filename: &str) -> Option<i32> {
    filename.as_bytes().windows(4).find_map(|window| {
        (window[0] == b'2'
            && window[1] == b'0'
            && window[2].is_ascii_digit()
            && window[3].is_ascii_digit())
        .then(|| 2000 + i32::from(window[2] - b'0') * 10 + i32::from(window[3] - b'0'))
    })
}

/// Assigns identifiers and sorts one partition, newest first. Missing
/// timestamps sort as epoch 0, i.e. last.
fn finalize(prefix: &str, records: &[RawRecord]) -> Vec<HistoryItem> {
    let mut items: Vec<HistoryItem> = records
        .iter()
        .enumerate()
        .map(|(index, record)| to_item(prefix, index, record))
        .collect();
    items.sort_by_key(|item| {
        std::cmp::Reverse(item.timestamp.map(|t| t.timestamp_millis()).unwrap_or(0))
    });
    items
}

fn to_item(prefix: &str, index: usize, record: &RawRecord) -> HistoryItem {
    let filename = record.resolved_filename().unwrap_or("").to_string();
    let id = record
        .id
        .clone()
        .unwrap_or_else(|| synthesize_id(prefix, &filename, record, index));
    HistoryItem {
        id,
        filename,
        file_path: record.filepath.clone(),
        url: record.url.clone(),
        download_url: record.download_url.clone(),
        source_url: record.source_page_url().map(str::to_string),
        timestamp: record.resolved_timestamp(),
        size: record.resolved_size(),
        mime: record.mime.clone(),
        status: record.status.clone(),
    }
}

/// Deterministic identifier for records that never got one. Includes the
/// item's position in the post-filter sequence, so it is stable within a
/// single pass but not across runs that merge sources in a different
/// order.
fn synthesize_id(prefix: &str, filename: &str, record: &RawRecord, index: usize) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((base, extension)) if !extension.is_empty() => base,
        _ => filename,
    };
    let timestamp = record
        .timestamp
        .as_ref()
        .map(TimestampValue::key_fragment)
        .unwrap_or_else(|| "0".to_string());
    let size = record.resolved_size().unwrap_or(0);
    let id = format!(
        "{prefix}{}_{timestamp}_{size}_{index}",
        stem.to_ascii_lowercase()
    );
    id.chars().take(SYNTH_ID_MAX_CHARS).collect()
}
