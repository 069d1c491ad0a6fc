//! HTTP event-stream transport built on `reqwest-eventsource`.
//!
//! DESIGN
//! ======
//! Each opened connection owns one background task that drives a
//! [`reqwest_eventsource::EventSource`] and forwards what it yields over an
//! unbounded channel. The event source handles the wire format, `Last-Event-ID`
//! on reconnect and server `retry:` hints; [`ReconnectPolicy`] only decides how
//! many consecutive reconnects are allowed and how long to wait.
//!
//! Readiness lives in a shared atomic that is updated *before* the matching
//! error event is queued. The atomic can therefore run ahead of the consumer;
//! the state carried inside [`TransportEvent::Error`] is the one to act on.
//!
//! ERROR HANDLING
//! ==============
//! - non-200 status or a non `text/event-stream` body: the event source
//!   closes itself, so the error event carries `Closed`. No retry.
//! - request failure, body failure or end of body: the policy is asked. A
//!   granted retry reports `Connecting`; a refused one reports `Closed`.

#[cfg(test)]
#[path = "event_source_test.rs"]
mod event_source_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest_eventsource::retry::RetryPolicy;
use reqwest_eventsource::{Event, EventSource};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::transport::{Connection, ReadyState, Transport, TransportEvent};
use crate::config::ClientConfig;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(#[from] reqwest::Error),
}

/// Fixed-delay reconnects, capped by consecutive attempts.
///
/// The event source resets its retry count once a connection opens, so the
/// cap applies to failures in a row rather than over the whole session.
#[derive(Clone, Copy, Debug)]
struct ReconnectPolicy {
    delay: Duration,
    max_attempts: u32,
    server_delay: Option<Duration>,
}

impl ReconnectPolicy {
    fn from_config(config: &ClientConfig) -> Self {
        Self { delay: config.reconnect_delay, max_attempts: config.max_reconnect_attempts, server_delay: None }
    }
}

impl RetryPolicy for ReconnectPolicy {
    fn retry(&self, _error: &reqwest_eventsource::Error, last_retry: Option<(usize, Duration)>) -> Option<Duration> {
        let attempts = last_retry.map_or(0, |(count, _)| count);
        let allowed = usize::try_from(self.max_attempts).unwrap_or(usize::MAX);
        if attempts >= allowed {
            return None;
        }
        Some(self.server_delay.unwrap_or(self.delay))
    }

    fn set_reconnection_time(&mut self, duration: Duration) {
        self.server_delay = Some(duration);
    }
}

/// Opens [`EventSourceConnection`]s with a shared HTTP client.
///
/// `open` spawns onto the current Tokio runtime and must be called from
/// within one.
pub struct EventSourceTransport {
    http: reqwest::Client,
    policy: ReconnectPolicy,
}

impl EventSourceTransport {
    /// # Errors
    ///
    /// Returns [`TransportError::HttpClientBuild`] if the HTTP client cannot
    /// be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self::with_client(http, config))
    }

    #[must_use]
    pub fn with_client(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self { http, policy: ReconnectPolicy::from_config(config) }
    }
}

impl Transport for EventSourceTransport {
    fn open(&self, url: &str) -> Box<dyn Connection> {
        let state = Arc::new(AtomicU8::new(ReadyState::Connecting as u8));
        let (tx, rx) = mpsc::unbounded_channel();

        let request = self
            .http
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");
        let task = match EventSource::new(request) {
            Ok(mut source) => {
                source.set_retry_policy(Box::new(self.policy));
                info!(%url, "event stream opening");
                Some(tokio::spawn(run_connection(source, url.to_owned(), Arc::clone(&state), tx)))
            }
            Err(e) => {
                warn!(%url, error = ?e, "event stream request rejected");
                raise(&state, &tx, ReadyState::Closed);
                None
            }
        };

        Box::new(EventSourceConnection { url: url.to_owned(), state, rx, task })
    }
}

pub struct EventSourceConnection {
    url: String,
    state: Arc<AtomicU8>,
    rx: mpsc::UnboundedReceiver<TransportEvent>,
    task: Option<JoinHandle<()>>,
}

#[async_trait]
impl Connection for EventSourceConnection {
    fn url(&self) -> &str {
        &self.url
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_u8(self.state.load(Ordering::Acquire))
    }

    async fn next_event(&mut self) -> Option<TransportEvent> {
        self.rx.recv().await
    }

    fn close(&mut self) {
        set_state(&self.state, ReadyState::Closed);
        self.rx.close();
        let Some(task) = self.task.take() else {
            return;
        };
        task.abort();
        debug!(url = %self.url, "event stream closed");
    }
}

impl Drop for EventSourceConnection {
    fn drop(&mut self) {
        self.close();
    }
}

fn set_state(state: &AtomicU8, ready_state: ReadyState) {
    state.store(ready_state as u8, Ordering::Release);
}

/// Update readiness, then queue the matching error event.
fn raise(state: &AtomicU8, tx: &mpsc::UnboundedSender<TransportEvent>, ready_state: ReadyState) -> bool {
    set_state(state, ready_state);
    tx.send(TransportEvent::Error { ready_state }).is_ok()
}

fn ready_state_of(source: &EventSource) -> ReadyState {
    match source.ready_state() {
        reqwest_eventsource::ReadyState::Connecting => ReadyState::Connecting,
        reqwest_eventsource::ReadyState::Open => ReadyState::Open,
        reqwest_eventsource::ReadyState::Closed => ReadyState::Closed,
    }
}

async fn run_connection(
    mut source: EventSource,
    url: String,
    state: Arc<AtomicU8>,
    tx: mpsc::UnboundedSender<TransportEvent>,
) {
    while let Some(next) = source.next().await {
        match next {
            Ok(Event::Open) => {
                set_state(&state, ReadyState::Open);
                debug!(%url, "event stream open");
            }
            Ok(Event::Message(message)) => {
                let event = TransportEvent::Message { event: message.event, data: message.data };
                if tx.send(event).is_err() {
                    break;
                }
            }
            Err(e) => {
                let ready_state = ready_state_of(&source);
                match ready_state {
                    ReadyState::Connecting => debug!(%url, error = %e, "event stream reconnecting"),
                    _ => warn!(%url, error = %e, ready_state = ready_state.as_str(), "event stream error"),
                }
                if !raise(&state, &tx, ready_state) || ready_state == ReadyState::Closed {
                    break;
                }
            }
        }
    }
    source.close();
    set_state(&state, ReadyState::Closed);
}
