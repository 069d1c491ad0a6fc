//! Stream reconciler: turns a presentation's event stream into committed
//! store snapshots.
//!
//! DESIGN
//! ======
//! One [`StreamReconciler`] is owned by the page showing a presentation.
//! `start` creates (or skips, or replaces) the single [`StreamSession`]; each
//! event then runs synchronously through `handle_event`. The session owns the
//! connection, the raw accumulation buffer and the last committed slide
//! count. Nothing outside the session reads the buffer; readers observe only
//! what reaches the [`PresentationStore`].
//!
//! LIFECYCLE
//! =========
//! ```text
//! idle --start(token)--> streaming --complete/closing/error/open failure--> idle
//!   \--start(no token)--> fetch collaborator, stays idle
//! ```
//! Replacing or dropping the session always closes its connection first, so
//! at most one connection is ever live.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here returns an error. Incomplete buffers are silent, malformed
//! terminal payloads are logged and reset the session, and error frames or
//! failures on an open connection become a notification plus the error flag.

#[cfg(test)]
#[path = "reconciler_test.rs"]
mod reconciler_test;

use std::sync::Arc;

use frames::{FrameKind, StreamFrame, decode_frame};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::repair::{JsonRepair, TolerantParser};
use crate::config::ClientConfig;
use crate::net::transport::{Connection, ReadyState, Transport, TransportEvent};
use crate::state::presentation::{PresentationStore, StoreError, slide_count};
use crate::state::ui::UiFlags;
use crate::util::navigation::Navigator;
use crate::util::notify::{Notifier, STREAM_ERROR_FALLBACK, STREAM_ERROR_TITLE};

/// External collaborators the reconciler writes through.
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn Transport>,
    pub store: Arc<dyn PresentationStore>,
    pub flags: Arc<dyn UiFlags>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

/// What `start` decided to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// A live session for the same presentation already exists.
    AlreadyStreaming,
    /// A new connection was opened.
    Streaming,
    /// No stream token; the fetch collaborator ran instead.
    Fallback,
}

#[derive(Debug, thiserror::Error)]
enum CommitError {
    #[error("{0} frame carried no presentation")]
    MissingPresentation(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

struct StreamSession {
    presentation_id: String,
    connection: Box<dyn Connection>,
    buffer: String,
    committed_slides: usize,
}

pub struct StreamReconciler {
    config: ClientConfig,
    deps: Collaborators,
    repair: Box<dyn JsonRepair>,
    session: Option<StreamSession>,
}

impl StreamReconciler {
    #[must_use]
    pub fn new(config: ClientConfig, deps: Collaborators) -> Self {
        Self { config, deps, repair: Box::new(TolerantParser::default()), session: None }
    }

    /// Swap the partial-JSON strategy.
    #[must_use]
    pub fn with_repair(mut self, repair: Box<dyn JsonRepair>) -> Self {
        self.repair = repair;
        self
    }

    /// Presentation of the current session, if any.
    #[must_use]
    pub fn presentation_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.presentation_id.as_str())
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.session.is_some()
    }

    /// Slide count of the last snapshot committed by the current session.
    #[must_use]
    pub fn committed_slides(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.committed_slides)
    }

    /// Begin streaming `presentation_id`, or load it via `fetch_existing_slides`
    /// when no stream token is given.
    pub fn start<F>(&mut self, presentation_id: &str, stream_token: Option<&str>, fetch_existing_slides: F) -> StartOutcome
    where
        F: FnOnce(),
    {
        if !stream_token.is_some_and(|t| !t.is_empty()) {
            info!(%presentation_id, "no stream token; loading existing presentation");
            self.teardown();
            fetch_existing_slides();
            return StartOutcome::Fallback;
        }

        if let Some(session) = &self.session {
            if session.presentation_id == presentation_id && session.connection.ready_state() != ReadyState::Closed {
                debug!(%presentation_id, "stream already initialized");
                return StartOutcome::AlreadyStreaming;
            }
        }
        self.teardown();

        self.deps.store.set_streaming(true);
        self.deps.store.clear_presentation_data();

        let url = self.config.stream_url(presentation_id);
        info!(%presentation_id, %url, "starting presentation stream");
        let connection = self.deps.transport.open(&url);
        self.session = Some(StreamSession {
            presentation_id: presentation_id.to_owned(),
            connection,
            buffer: String::new(),
            committed_slides: 0,
        });
        StartOutcome::Streaming
    }

    /// Close the connection and forget the session. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.connection.close();
            debug!(presentation_id = %session.presentation_id, buffered = session.buffer.len(), "stream session closed");
        }
    }

    /// React to one transport event.
    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Message { event, data } => {
                if event != self.config.stream_event {
                    debug!(%event, "ignoring unrelated event");
                    return;
                }
                match decode_frame(&data) {
                    Ok(frame) => self.handle_frame(frame),
                    Err(e) => warn!(presentation_id = ?self.presentation_id(), error = %e, "dropping undecodable frame"),
                }
            }
            TransportEvent::Error { ready_state } => self.handle_transport_error(ready_state),
        }
    }

    pub fn handle_frame(&mut self, frame: StreamFrame) {
        if self.session.is_none() {
            let kind = frame.kind();
            if kind.is_terminal() {
                warn!(kind = kind.as_str(), "terminal frame after the session ended");
            } else {
                debug!(kind = kind.as_str(), "frame without a session");
            }
            return;
        }
        match frame {
            StreamFrame::Chunk(fragment) => self.on_chunk(&fragment),
            StreamFrame::Complete { presentation } => self.on_terminal(FrameKind::Complete, presentation),
            StreamFrame::Closing { presentation } => self.on_terminal(FrameKind::Closing, presentation),
            StreamFrame::Error { detail } => self.on_error_frame(detail),
        }
    }

    /// Apply the readiness policy for a transport condition.
    pub fn handle_transport_error(&mut self, ready_state: ReadyState) {
        let Some(session) = &self.session else {
            return;
        };
        let presentation_id = session.presentation_id.clone();
        match ready_state {
            ReadyState::Closed => {
                debug!(%presentation_id, "event stream closed");
                self.deps.flags.set_loading(false);
                self.deps.store.set_streaming(false);
            }
            ReadyState::Connecting => {
                debug!(%presentation_id, "event stream reconnecting");
            }
            ReadyState::Open => {
                error!(%presentation_id, "event stream failed while open");
                self.teardown();
                self.deps.notifier.error(STREAM_ERROR_TITLE, STREAM_ERROR_FALLBACK);
                self.deps.flags.set_loading(false);
                self.deps.store.set_streaming(false);
                self.deps.flags.set_error(true);
            }
        }
    }

    /// Drive the current session until it ends or its connection closes.
    ///
    /// Stops on the event that reports `Closed`, not on the connection's live
    /// state: the transport may already be closed while frames it queued
    /// earlier are still waiting here.
    pub async fn run(&mut self) {
        while let Some(session) = self.session.as_mut() {
            let Some(event) = session.connection.next_event().await else {
                debug!(presentation_id = %session.presentation_id, "event stream ended");
                break;
            };
            let closed = matches!(event, TransportEvent::Error { ready_state: ReadyState::Closed });
            self.handle_event(event);
            if closed {
                break;
            }
        }
    }

    fn on_chunk(&mut self, fragment: &str) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.buffer.push_str(fragment);

        let Some(partial) = self.repair.parse(&session.buffer) else {
            return;
        };
        let Some(count) = slide_count(&partial) else {
            return;
        };
        if count == 0 || count == session.committed_slides {
            return;
        }
        if count < session.committed_slides {
            debug!(presentation_id = %session.presentation_id, count, committed = session.committed_slides, "ignoring shrunken snapshot");
            return;
        }

        match self.deps.store.set_presentation_data(partial) {
            Ok(()) => {
                session.committed_slides = count;
                self.deps.flags.set_loading(false);
                debug!(presentation_id = %session.presentation_id, slides = count, "committed partial presentation");
            }
            Err(e) => warn!(presentation_id = %session.presentation_id, error = %e, "partial presentation refused"),
        }
    }

    fn on_terminal(&mut self, kind: FrameKind, presentation: Option<Value>) {
        let presentation_id = self.presentation_id().unwrap_or_default().to_owned();
        let committed = presentation
            .ok_or(CommitError::MissingPresentation(kind.as_str()))
            .and_then(|p| {
                let slides = slide_count(&p);
                self.deps.store.set_presentation_data(p)?;
                Ok(slides)
            });

        match committed {
            Ok(slides) => {
                self.deps.flags.set_loading(false);
                self.deps.store.set_streaming(false);
                self.teardown();
                self.deps.navigator.strip_stream_token();
                info!(%presentation_id, kind = kind.as_str(), slides = ?slides, "presentation stream finished");
            }
            Err(e) => {
                self.teardown();
                error!(%presentation_id, kind = kind.as_str(), error = %e, "failed to commit final presentation");
            }
        }
    }

    fn on_error_frame(&mut self, detail: Option<String>) {
        let presentation_id = self.presentation_id().unwrap_or_default().to_owned();
        self.teardown();

        let description = detail
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(STREAM_ERROR_FALLBACK);
        warn!(%presentation_id, %description, "presentation stream reported an error");
        self.deps.notifier.error(STREAM_ERROR_TITLE, description);

        self.deps.flags.set_loading(false);
        self.deps.store.set_streaming(false);
        self.deps.flags.set_error(true);
    }
}

impl Drop for StreamReconciler {
    fn drop(&mut self) {
        self.teardown();
    }
}
