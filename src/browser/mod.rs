//! Headless page rendering.
//!
//! SYSTEM CONTEXT
//! ==============
//! Export and template extraction both need the web app's pages rendered by a
//! real browser. They go through [`PageRenderer`] so handlers can be tested
//! with a scripted renderer; [`chrome::HeadlessChrome`] is the production
//! implementation.

pub mod chrome;

use std::time::Duration;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to launch browser `{executable}`: {source}")]
    Launch {
        executable: String,
        #[source]
        source: std::io::Error,
    },
    #[error("browser timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("browser exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("browser output unavailable: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Serialized DOM of `url` after the page has settled.
    async fn dump_dom(&self, url: &str, timeout: Duration) -> Result<String, RenderError>;

    /// `url` printed to a 1280x720 PDF.
    async fn print_pdf(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, RenderError>;
}
