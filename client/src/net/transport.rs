//! Transport seam between the reconciler and a server-sent event connection.
//!
//! SYSTEM CONTEXT
//! ==============
//! The reconciler never touches HTTP directly. It asks a [`Transport`] to open
//! a [`Connection`] for a URL and then pulls [`TransportEvent`]s from it one at
//! a time. Reconnect and timeout behavior belong to the transport; the
//! reconciler only reacts to the readiness reported alongside error events.

use async_trait::async_trait;

/// Connection readiness, numbered like `EventSource.readyState`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closed = 2,
}

impl ReadyState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "CONNECTING",
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            _ => Self::Closed,
        }
    }
}

/// Something observed on a connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// A dispatched server-sent event.
    Message { event: String, data: String },
    /// Transport-level condition without a payload, with the readiness
    /// observed when it was raised.
    Error { ready_state: ReadyState },
}

/// One live event-stream connection.
#[async_trait]
pub trait Connection: Send {
    fn url(&self) -> &str;

    fn ready_state(&self) -> ReadyState;

    /// Wait for the next event. `None` once the connection has ended and no
    /// buffered events remain.
    async fn next_event(&mut self) -> Option<TransportEvent>;

    /// Stop the connection. Closing twice is a no-op.
    fn close(&mut self);
}

/// Factory for connections.
pub trait Transport: Send + Sync {
    fn open(&self, url: &str) -> Box<dyn Connection>;
}
