use super::*;
use serde_json::json;

#[test]
fn new_store_is_empty_and_idle() {
    let store = MemoryStore::new();
    let snap = store.snapshot();
    assert!(snap.presentation.is_none());
    assert!(!snap.streaming);
    assert_eq!(snap.revision, 0);
    assert_eq!(snap.slide_count(), None);
}

#[test]
fn set_presentation_replaces_whole_value() {
    let store = MemoryStore::new();
    store.set_presentation_data(json!({"title": "a", "slides": [1, 2]})).expect("commit");
    store.set_presentation_data(json!({"slides": [1]})).expect("commit");

    let snap = store.snapshot();
    assert_eq!(snap.presentation, Some(json!({"slides": [1]})));
    assert_eq!(snap.revision, 2);
    assert_eq!(snap.slide_count(), Some(1));
}

#[test]
fn set_presentation_rejects_non_object() {
    let store = MemoryStore::new();
    store.set_presentation_data(json!({"slides": []})).expect("commit");

    let err = store.set_presentation_data(json!([1, 2])).expect_err("array refused");
    assert!(err.to_string().contains("array"));
    assert_eq!(store.snapshot().presentation, Some(json!({"slides": []})));
    assert_eq!(store.snapshot().revision, 1);
}

#[test]
fn clear_keeps_revision_and_streaming() {
    let store = MemoryStore::new();
    store.set_streaming(true);
    store.set_presentation_data(json!({"slides": []})).expect("commit");
    store.clear_presentation_data();

    let snap = store.snapshot();
    assert!(snap.presentation.is_none());
    assert!(snap.streaming);
    assert_eq!(snap.revision, 1);
}

#[test]
fn clones_share_state() {
    let store = MemoryStore::new();
    let reader = store.clone();
    store.set_streaming(true);
    assert!(reader.snapshot().streaming);
}

#[test]
fn slide_count_requires_array() {
    assert_eq!(slide_count(&json!({"slides": [{}, {}]})), Some(2));
    assert_eq!(slide_count(&json!({"slides": "none"})), None);
    assert_eq!(slide_count(&json!({"title": "x"})), None);
}

#[tokio::test]
async fn subscribers_observe_commits() {
    let store = MemoryStore::new();
    let mut rx = store.subscribe();

    store.set_presentation_data(json!({"slides": [1, 2, 3]})).expect("commit");
    rx.changed().await.expect("sender alive");
    assert_eq!(rx.borrow_and_update().slide_count(), Some(3));
}

#[tokio::test]
async fn unchanged_streaming_flag_does_not_notify() {
    let store = MemoryStore::new();
    let mut rx = store.subscribe();
    store.set_streaming(false);
    assert!(!rx.has_changed().expect("sender alive"));
}
