//! User-facing notifications.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::sync::{Mutex, PoisonError};

use tracing::error;

pub const STREAM_ERROR_TITLE: &str = "Error in outline streaming";
pub const STREAM_ERROR_FALLBACK: &str = "Failed to connect to the server. Please try again.";

/// Toast-style error sink.
pub trait Notifier: Send + Sync {
    fn error(&self, title: &str, description: &str);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

/// Logs every notification and keeps a history for inspection.
#[derive(Default)]
pub struct TracingNotifier {
    history: Mutex<Vec<Notification>>,
}

impl TracingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Notifier for TracingNotifier {
    fn error(&self, title: &str, description: &str) {
        error!(%title, %description, "notification");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification { title: title.to_owned(), description: description.to_owned() });
    }
}
