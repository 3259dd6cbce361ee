use std::collections::HashSet;

use crate::record::{RawRecord, TimestampValue};

/// How much of the URL participates in a generic download's dedup key.
const URL_KEY_PREFIX_CHARS: usize = 50;

/// Dedup key for one record.
///
/// Screenshot filenames embed a capture timestamp that is already unique
/// per shot, so the key is just the stem plus the stored timestamp.
/// Generic downloads need size and a URL prefix as well, so that the same
/// filename fetched repeatedly from different places stays distinct.
pub fn dedup_key(record: &RawRecord) -> String {
    let filename = record.resolved_filename().unwrap_or("");
    let timestamp = record
        .timestamp
        .as_ref()
        .map(TimestampValue::key_fragment)
        .unwrap_or_else(|| "0".to_string());

    if filename.to_ascii_lowercase().contains("screenshot") {
        format!("ss-{}-{}", stem(filename), timestamp)
    } else {
        let size = record.resolved_size().unwrap_or(0);
        let url_prefix: String = record
            .resolved_url()
            .unwrap_or("")
            .chars()
            .take(URL_KEY_PREFIX_CHARS)
            .collect();
        format!("{filename}-{size}-{timestamp}-{url_prefix}")
    }
}

/// Keeps the first occurrence per dedup key, in input order. Idempotent:
/// running it on its own output drops nothing further.
pub fn dedupe(records: Vec<RawRecord>) -> Vec<RawRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(dedup_key(record)))
        .collect()
}

/// Filename without its final extension.
fn stem(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((base, extension)) if !extension.is_empty() => base,
        _ => filename,
    }
}
