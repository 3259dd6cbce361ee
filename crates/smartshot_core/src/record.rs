use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::classify::is_usable_link;

/// Terminal state of a tracked download. There are no non-terminal values
/// here on purpose: a record is only written once its state is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadStatus {
    #[serde(rename = "complete")]
    Complete,
    #[serde(rename = "interrupted")]
    Interrupted,
    #[serde(rename = "timeout")]
    TimedOut,
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadStatus::Complete => write!(f, "complete"),
            DownloadStatus::Interrupted => write!(f, "interrupted"),
            DownloadStatus::TimedOut => write!(f, "timeout"),
        }
    }
}

/// Timestamp as found in storage: either epoch milliseconds or a textual
/// RFC 3339 instant, depending on which extension version wrote the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimestampValue {
    Millis(i64),
    Text(String),
}

impl TimestampValue {
    /// Resolves to a concrete instant, or `None` when the stored value is
    /// out of range or unparseable.
    pub fn resolve(&self) -> Option<DateTime<Utc>> {
        match self {
            TimestampValue::Millis(millis) => Utc.timestamp_millis_opt(*millis).single(),
            TimestampValue::Text(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|parsed| parsed.with_timezone(&Utc)),
        }
    }

    /// Raw value rendered for dedup keys and synthesized ids. Deterministic
    /// even when the value does not resolve to a valid instant.
    pub fn key_fragment(&self) -> String {
        match self {
            TimestampValue::Millis(millis) => millis.to_string(),
            TimestampValue::Text(text) => text.clone(),
        }
    }
}

/// One item as persisted in a history bucket. Entries were written by
/// several extension versions with inconsistent field names, so every
/// field is optional and resolution happens through the `resolved_*`
/// accessors with a fixed precedence, applied once at ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    #[serde(
        deserialize_with = "deserialize_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(alias = "filePath", skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "downloadUrl", skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(rename = "originalUrl", skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(rename = "tabUrl", skip_serializing_if = "Option::is_none")]
    pub tab_url: Option<String>,
    #[serde(rename = "pageUrl", skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
    #[serde(rename = "sourceUrl", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(rename = "tabTitle", skip_serializing_if = "Option::is_none")]
    pub tab_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<TimestampValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(rename = "fileSize", skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(rename = "totalBytes", skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl RawRecord {
    /// Leaf filename with precedence: filepath, filename, name.
    pub fn resolved_filename(&self) -> Option<&str> {
        self.filepath
            .as_deref()
            .and_then(leaf)
            .or_else(|| self.filename.as_deref().and_then(leaf))
            .or_else(|| self.name.as_deref().and_then(leaf))
    }

    /// Byte size with precedence: size, fileSize, totalBytes.
    pub fn resolved_size(&self) -> Option<u64> {
        self.size.or(self.file_size).or(self.total_bytes)
    }

    /// Creation instant, if the stored timestamp resolves.
    pub fn resolved_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_ref().and_then(TimestampValue::resolve)
    }

    /// Whether a timestamp is present at all; a present-but-unresolvable
    /// timestamp is treated differently from an absent one.
    pub fn has_timestamp(&self) -> bool {
        self.timestamp.is_some()
    }

    /// Source URL with precedence: url, downloadUrl, originalUrl.
    pub fn resolved_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .or(self.download_url.as_deref())
            .or(self.original_url.as_deref())
    }

    /// Page that triggered the download, whichever field recorded it.
    pub fn source_page_url(&self) -> Option<&str> {
        self.tab_url
            .as_deref()
            .or(self.page_url.as_deref())
            .or(self.source_url.as_deref())
            .or(self.referrer.as_deref())
    }
}

/// One retained entry per observed download, written once the download
/// reaches its terminal state and never mutated afterwards. Serializes to
/// the storage field names so existing readers keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRecord {
    pub id: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub original_url: String,
    pub download_url: String,
    pub tab_title: String,
    pub tab_url: String,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
    pub status: DownloadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

/// Normalized record produced by reconciliation; derived, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryItem {
    pub id: String,
    pub filename: String,
    pub file_path: Option<String>,
    pub url: Option<String>,
    pub download_url: Option<String>,
    pub source_url: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub size: Option<u64>,
    pub mime: Option<String>,
    pub status: Option<String>,
}

impl HistoryItem {
    /// URL a downloads view may render as a link. `blob:` and `data:`
    /// schemes are never usable here, even though such records can still
    /// appear in the screenshot partition.
    pub fn link_url(&self) -> Option<&str> {
        self.download_url
            .as_deref()
            .or(self.url.as_deref())
            .filter(|candidate| is_usable_link(candidate))
    }
}

/// Last path component, splitting on both separator styles. Empty leaves
/// (trailing separator) count as absent.
pub(crate) fn leaf(path: &str) -> Option<&str> {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Storage ids appear both as integers (host download ids) and strings
/// (synthesized ids); normalize to text.
fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        Text(String),
        Number(i64),
    }

    Ok(Option::<IdValue>::deserialize(deserializer)?.map(|value| match value {
        IdValue::Text(text) => text,
        IdValue::Number(number) => number.to_string(),
    }))
}
