//! Presentation-data store contract and its in-memory implementation.
//!
//! SYSTEM CONTEXT
//! ==============
//! The reconciler writes committed presentation snapshots through the narrow
//! [`PresentationStore`] trait and never reads them back. Readers (renderers,
//! the CLI, tests) observe [`MemoryStore`] either by polling
//! [`MemoryStore::snapshot`] or by subscribing to its watch channel.

#[cfg(test)]
#[path = "presentation_test.rs"]
mod presentation_test;

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

/// Errors raised when a commit is refused.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("presentation payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Write-only view of the presentation store used by the reconciler.
pub trait PresentationStore: Send + Sync {
    /// Drop any committed presentation.
    fn clear_presentation_data(&self);

    /// Replace the committed presentation in one step.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the payload is refused; the previously
    /// committed value stays in place.
    fn set_presentation_data(&self, presentation: Value) -> Result<(), StoreError>;

    fn set_streaming(&self, streaming: bool);
}

/// Point-in-time copy of the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreSnapshot {
    pub presentation: Option<Value>,
    pub streaming: bool,
    /// Incremented on every successful `set_presentation_data`.
    pub revision: u64,
}

impl StoreSnapshot {
    /// Number of slides in the committed presentation, if it has a slide list.
    #[must_use]
    pub fn slide_count(&self) -> Option<usize> {
        self.presentation.as_ref().and_then(slide_count)
    }
}

/// Length of the `slides` array of a presentation object.
#[must_use]
pub fn slide_count(presentation: &Value) -> Option<usize> {
    presentation.get("slides").and_then(Value::as_array).map(Vec::len)
}

/// Shared in-memory store. Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct MemoryStore {
    tx: Arc<watch::Sender<StoreSnapshot>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StoreSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.tx.borrow().clone()
    }

    /// Receive every change to the store.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationStore for MemoryStore {
    fn clear_presentation_data(&self) {
        self.tx.send_modify(|s| s.presentation = None);
    }

    fn set_presentation_data(&self, presentation: Value) -> Result<(), StoreError> {
        if !presentation.is_object() {
            return Err(StoreError::NotAnObject(json_type_name(&presentation)));
        }
        self.tx.send_modify(|s| {
            s.presentation = Some(presentation);
            s.revision += 1;
        });
        Ok(())
    }

    fn set_streaming(&self, streaming: bool) {
        self.tx.send_if_modified(|s| {
            let changed = s.streaming != streaming;
            s.streaming = streaming;
            changed
        });
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
