use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shot_logging::{shot_error, shot_info, shot_warn};
use smartshot_core::{cleanup_retain, CleanupConfig, DownloadRecord, RawRecord};

use crate::error::StoreError;
use crate::host::KeyValueStore;

/// Primary history bucket.
pub const HISTORY_KEY: &str = "downloadHistory";

/// Buckets older extension versions wrote. The same logical list ended up
/// split across these by accident of history; reconciliation reads them
/// all, primary bucket first.
pub const LEGACY_KEYS: [&str; 6] = [
    "smartshotHistory",
    "screenshots",
    "capturedImages",
    "imageDownloads",
    "fileDownloads",
    "downloads",
];

/// Retention cap on the primary history list.
pub const MAX_HISTORY_ITEMS: usize = 1000;

pub const SETTINGS_KEY: &str = "settings";

/// Persisted extension settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub capture_quality: String,
    pub default_format: String,
    pub max_history_items: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            capture_quality: "high".to_string(),
            default_format: "png".to_string(),
            max_history_items: MAX_HISTORY_ITEMS,
        }
    }
}

/// Owner of the persisted history collections. The key-value collaborator
/// offers no partial updates, so every mutation is a wholesale
/// read-modify-write of the stored list.
#[derive(Clone)]
pub struct HistoryStore {
    kv: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Install-time initialization: empty history plus default settings.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        self.kv.set(HISTORY_KEY, Value::Array(Vec::new())).await?;
        let settings = match serde_json::to_value(Settings::default()) {
            Ok(value) => value,
            Err(err) => {
                shot_error!("Failed to serialize default settings: {err}");
                Value::Null
            }
        };
        self.kv.set(SETTINGS_KEY, settings).await?;
        Ok(())
    }

    pub async fn settings(&self) -> Result<Settings, StoreError> {
        Ok(self
            .kv
            .get(SETTINGS_KEY)
            .await?
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default())
    }

    /// The primary history list exactly as stored.
    pub async fn raw_history(&self) -> Result<Vec<Value>, StoreError> {
        match self.kv.get(HISTORY_KEY).await? {
            Some(Value::Array(items)) => Ok(items),
            _ => Ok(Vec::new()),
        }
    }

    /// Decoded primary history list. Undecodable entries are skipped with
    /// a warning, never fatal.
    pub async fn load(&self) -> Result<Vec<RawRecord>, StoreError> {
        Ok(decode_records(self.raw_history().await?, HISTORY_KEY))
    }

    /// Every storage bucket that may hold history records, primary first,
    /// in the fixed priority order reconciliation expects.
    pub async fn load_sources(&self) -> Result<Vec<Vec<RawRecord>>, StoreError> {
        let mut sources = Vec::with_capacity(1 + LEGACY_KEYS.len());
        sources.push(self.load().await?);
        for key in LEGACY_KEYS {
            if let Some(Value::Array(items)) = self.kv.get(key).await? {
                if !items.is_empty() {
                    sources.push(decode_records(items, key));
                }
            }
        }
        Ok(sources)
    }

    /// Prepends a record and truncates to capacity, evicting the oldest.
    ///
    /// Read-modify-write over the whole list: concurrent completions can
    /// race and the last writer wins. Accepted weakness, not a guarantee.
    pub async fn append(&self, record: &DownloadRecord) -> Result<(), StoreError> {
        let encoded = match serde_json::to_value(record) {
            Ok(value) => value,
            Err(err) => {
                shot_error!("Failed to serialize download record {}: {err}", record.id);
                return Ok(());
            }
        };
        let mut items = self.raw_history().await?;
        items.insert(0, encoded);
        items.truncate(MAX_HISTORY_ITEMS);
        self.kv.set(HISTORY_KEY, Value::Array(items)).await?;
        Ok(())
    }

    /// Resets the primary history list to empty.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.kv.set(HISTORY_KEY, Value::Array(Vec::new())).await?;
        Ok(())
    }

    /// Maintenance pass: drops entries with implausible timestamps or no
    /// usable file info, writing back only if the list actually shrank.
    /// Returns the number of dropped entries.
    pub async fn run_cleanup(
        &self,
        config: &CleanupConfig,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let items = self.raw_history().await?;
        let before = items.len();
        let kept: Vec<Value> = items
            .into_iter()
            .filter(|value| match serde_json::from_value::<RawRecord>(value.clone()) {
                Ok(record) => cleanup_retain(&record, config, now),
                Err(_) => false,
            })
            .collect();
        let dropped = before - kept.len();
        if dropped > 0 {
            self.kv.set(HISTORY_KEY, Value::Array(kept)).await?;
            shot_info!("History cleanup dropped {dropped} implausible entries");
        }
        Ok(dropped)
    }
}

fn decode_records(items: Vec<Value>, key: &str) -> Vec<RawRecord> {
    let total = items.len();
    let records: Vec<RawRecord> = items
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    if records.len() < total {
        shot_warn!(
            "Skipped {} undecodable entries in {key}",
            total - records.len()
        );
    }
    records
}
