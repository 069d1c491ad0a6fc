//! Address-bar handling for the one-time stream token.
//!
//! A page opened with `?stream=...` streams its presentation once. After a
//! terminal frame the token is removed so that a reload fetches the stored
//! result instead of starting a second generation.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

use std::sync::{PoisonError, RwLock};

use tracing::debug;
use url::Url;

/// Query parameter carrying the stream token.
pub const STREAM_PARAM: &str = "stream";

/// Navigation hook invoked by the reconciler.
pub trait Navigator: Send + Sync {
    /// Replace the current location with one lacking the stream token,
    /// without adding a history entry.
    fn strip_stream_token(&self);
}

/// In-memory stand-in for the browser location bar.
pub struct AddressBar {
    current: RwLock<Url>,
}

impl AddressBar {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self { current: RwLock::new(url) }
    }

    /// # Errors
    ///
    /// Returns the parse error when `url` is not absolute.
    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Url::parse(url).map(Self::new)
    }

    #[must_use]
    pub fn current(&self) -> Url {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The `stream` query value, if present.
    #[must_use]
    pub fn stream_token(&self) -> Option<String> {
        self.current()
            .query_pairs()
            .find(|(k, _)| k == STREAM_PARAM)
            .map(|(_, v)| v.into_owned())
    }
}

impl Navigator for AddressBar {
    fn strip_stream_token(&self) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let stripped = without_query_param(&current, STREAM_PARAM);
        debug!(from = %current, to = %stripped, "replacing location");
        *current = stripped;
    }
}

/// Copy of `url` with every `name` query pair removed. Other pairs keep
/// their order; an emptied query is dropped entirely.
#[must_use]
pub fn without_query_param(url: &Url, name: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != name)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut out = url.clone();
    if kept.is_empty() {
        out.set_query(None);
    } else {
        out.query_pairs_mut().clear().extend_pairs(kept);
    }
    out
}
