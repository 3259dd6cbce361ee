use std::sync::Arc;
use std::sync::Once;

use pretty_assertions::assert_eq;
use serde_json::json;
use smartshot_engine::{handle_message, HistoryStore, KeyValueStore, MemoryStore, HISTORY_KEY};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(shot_logging::initialize_for_tests);
}

#[tokio::test]
async fn get_history_returns_the_stored_list_verbatim() {
    init_logging();
    let kv = Arc::new(MemoryStore::new());
    let store = HistoryStore::new(kv.clone());

    let stored = json!([
        {"filename": "report.pdf", "size": 10},
        {"filename": "screenshot_page.png", "size": 20},
    ]);
    kv.set(HISTORY_KEY, stored.clone()).await.unwrap();

    let reply = handle_message(&store, &json!({"action": "getHistory"})).await;
    assert_eq!(reply, stored);
}

#[tokio::test]
async fn get_history_on_an_empty_store_returns_an_empty_list() {
    init_logging();
    let store = HistoryStore::new(Arc::new(MemoryStore::new()));

    let reply = handle_message(&store, &json!({"action": "getHistory"})).await;
    assert_eq!(reply, json!([]));
}

#[tokio::test]
async fn clear_history_acknowledges_and_empties_storage() {
    init_logging();
    let kv = Arc::new(MemoryStore::new());
    let store = HistoryStore::new(kv.clone());
    kv.set(HISTORY_KEY, json!([{"filename": "a.pdf", "size": 1}]))
        .await
        .unwrap();

    let reply = handle_message(&store, &json!({"action": "clearHistory"})).await;
    assert_eq!(reply, json!({"success": true}));
    assert_eq!(kv.get(HISTORY_KEY).await.unwrap(), Some(json!([])));
}

#[tokio::test]
async fn unknown_actions_are_answered_not_dropped() {
    init_logging();
    let store = HistoryStore::new(Arc::new(MemoryStore::new()));

    let reply = handle_message(&store, &json!({"action": "selfDestruct"})).await;
    assert_eq!(reply, json!({"error": "Unknown action"}));

    let reply = handle_message(&store, &json!({"payload": 1})).await;
    assert_eq!(reply, json!({"error": "Unknown action"}));
}
