//! One-shot load of an already generated presentation.
//!
//! Used when the page is opened without a stream token: the presentation
//! exists server-side and is fetched over plain REST instead of streamed.

#[cfg(test)]
#[path = "fetch_test.rs"]
mod fetch_test;

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::ClientConfig;
use crate::state::presentation::{PresentationStore, StoreError, slide_count};
use crate::state::ui::UiFlags;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// GET the presentation and commit it to `store`.
///
/// # Errors
///
/// Returns [`FetchError`] for transport failures, non-2xx responses, bodies
/// that are not JSON, or payloads the store refuses.
pub async fn fetch_existing_slides(
    http: &reqwest::Client,
    config: &ClientConfig,
    presentation_id: &str,
    store: &dyn PresentationStore,
) -> Result<Value, FetchError> {
    let url = config.presentation_url(presentation_id);
    let response = http.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let presentation: Value = response.json().await?;
    store.set_presentation_data(presentation.clone())?;
    Ok(presentation)
}

/// Run [`fetch_existing_slides`] in the background and settle the UI flags.
///
/// Loading is cleared either way; a failure also raises the error flag.
pub fn spawn_fetch_existing_slides(
    http: reqwest::Client,
    config: ClientConfig,
    presentation_id: String,
    store: Arc<dyn PresentationStore>,
    flags: Arc<dyn UiFlags>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match fetch_existing_slides(&http, &config, &presentation_id, store.as_ref()).await {
            Ok(presentation) => {
                let slides = slide_count(&presentation).unwrap_or(0);
                info!(%presentation_id, slides, "loaded existing presentation");
            }
            Err(e) => {
                error!(%presentation_id, error = %e, "failed to load existing presentation");
                flags.set_error(true);
            }
        }
        flags.set_loading(false);
    })
}
