use serde_json::{json, Value};
use shot_logging::shot_error;

use crate::store::HistoryStore;

/// Handles one request from a UI surface. The protocol is a JSON object
/// with an `action` field; every outcome, including failure, is answered
/// with a JSON value so the caller never hangs on a dropped request.
pub async fn handle_message(store: &HistoryStore, request: &Value) -> Value {
    match request.get("action").and_then(Value::as_str) {
        Some("getHistory") => match store.raw_history().await {
            Ok(items) => Value::Array(items),
            Err(err) => storage_failure("getHistory", err),
        },
        Some("clearHistory") => match store.clear().await {
            Ok(()) => json!({"success": true}),
            Err(err) => storage_failure("clearHistory", err),
        },
        _ => json!({"error": "Unknown action"}),
    }
}

fn storage_failure(action: &str, err: crate::error::StoreError) -> Value {
    shot_error!("Message action {action} failed: {err}");
    json!({"error": err.to_string()})
}
