//! Shared application state.
//!
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the immutable server config and the page renderer.

use std::sync::Arc;

use crate::browser::PageRenderer;
use crate::config::ServerConfig;

/// Clone is required by Axum; every field is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub renderer: Arc<dyn PageRenderer>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig, renderer: Arc<dyn PageRenderer>) -> Self {
        Self { config: Arc::new(config), renderer }
    }
}
