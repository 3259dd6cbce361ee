use chrono::{DateTime, Duration, Utc};

use crate::reconcile::passes_validity;
use crate::record::RawRecord;

/// Age horizon for the maintenance pass over the persisted store. Looser
/// than the read-path admission gate: cleanup only drops entries that are
/// clearly dead, not ones that merely fell out of the recent window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupConfig {
    pub max_age: Duration,
}

impl CleanupConfig {
    /// Periodic background pass.
    pub fn periodic() -> Self {
        Self {
            max_age: Duration::days(365),
        }
    }

    /// Destructive pass, used when the user asks for a deep clean.
    pub fn destructive() -> Self {
        Self {
            max_age: Duration::days(2 * 365),
        }
    }
}

/// Whether a persisted record survives cleanup. Retains records that pass
/// the validity filter and whose timestamp, when present, resolves, is not
/// in the future, and is not older than the configured horizon.
pub fn cleanup_retain(record: &RawRecord, config: &CleanupConfig, now: DateTime<Utc>) -> bool {
    if !passes_validity(record) {
        return false;
    }
    if !record.has_timestamp() {
        return true;
    }
    match record.resolved_timestamp() {
        Some(timestamp) => timestamp <= now && now - timestamp <= config.max_age,
        None => false,
    }
}
