//! Loading/error flags owned by the presentation page.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

use std::sync::Arc;

use tokio::sync::watch;

/// Externally owned UI state setters invoked by the reconciler.
pub trait UiFlags: Send + Sync {
    fn set_loading(&self, loading: bool);
    fn set_error(&self, error: bool);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiSnapshot {
    /// True until the first slides are visible.
    pub loading: bool,
    /// Set when generation failed; never cleared by the reconciler.
    pub error: bool,
}

impl Default for UiSnapshot {
    fn default() -> Self {
        Self { loading: true, error: false }
    }
}

/// Shared in-memory UI flags. Starts in the loading state.
#[derive(Clone)]
pub struct UiState {
    tx: Arc<watch::Sender<UiSnapshot>>,
}

impl UiState {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(UiSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn snapshot(&self) -> UiSnapshot {
        *self.tx.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<UiSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

impl UiFlags for UiState {
    fn set_loading(&self, loading: bool) {
        self.tx.send_if_modified(|s| std::mem::replace(&mut s.loading, loading) != loading);
    }

    fn set_error(&self, error: bool) {
        self.tx.send_if_modified(|s| std::mem::replace(&mut s.error, error) != error);
    }
}
