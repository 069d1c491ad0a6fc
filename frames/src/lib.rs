//! Shared frame model for the presentation generation event stream.
//!
//! This crate owns the wire representation used by both the streaming client
//! and any tooling that fakes the backend. The backend emits server-sent
//! events whose `data` field carries a JSON envelope:
//!
//! ```text
//! { "type": "chunk" | "complete" | "closing" | "error",
//!   "chunk"?: string, "presentation"?: object, "detail"?: string }
//! ```
//!
//! [`decode_frame`] turns one envelope into a typed [`StreamFrame`]. The
//! line-level event-stream format is left to the transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error returned by [`decode_frame`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The payload is not JSON or does not have the envelope shape.
    #[error("failed to decode frame envelope: {0}")]
    Decode(#[from] serde_json::Error),
    /// The envelope `type` does not map to a known [`FrameKind`].
    #[error("unknown frame type: {0}")]
    UnknownType(String),
}

/// Discriminant of a [`StreamFrame`], as spelled on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    /// Text fragment to append to the accumulation buffer.
    Chunk,
    /// Natural end of generation carrying the final presentation.
    Complete,
    /// Intentional early stop carrying the final presentation.
    Closing,
    /// Backend-reported failure.
    Error,
}

impl FrameKind {
    /// Wire spelling of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chunk => "chunk",
            Self::Complete => "complete",
            Self::Closing => "closing",
            Self::Error => "error",
        }
    }

    fn parse(raw: &str) -> Result<Self, CodecError> {
        match raw {
            "chunk" => Ok(Self::Chunk),
            "complete" => Ok(Self::Complete),
            "closing" => Ok(Self::Closing),
            "error" => Ok(Self::Error),
            other => Err(CodecError::UnknownType(other.to_owned())),
        }
    }

    /// True for the kinds that end a stream session.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Chunk)
    }
}

/// Raw JSON envelope as it appears in an event's `data` field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Frame kind, kept as a string so unknown kinds surface as
    /// [`CodecError::UnknownType`] instead of a generic decode error.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<Value>,
    /// Human-readable failure detail. The backend usually sends a string but
    /// framework error handlers may send structured detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

/// A single decoded event of the generation stream.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamFrame {
    /// Partial JSON text.
    Chunk(String),
    /// Final presentation after natural completion. `None` when the backend
    /// omitted the payload.
    Complete { presentation: Option<Value> },
    /// Final presentation after an intentional early stop.
    Closing { presentation: Option<Value> },
    /// Backend failure with optional detail text.
    Error { detail: Option<String> },
}

impl StreamFrame {
    #[must_use]
    pub fn kind(&self) -> FrameKind {
        match self {
            Self::Chunk(_) => FrameKind::Chunk,
            Self::Complete { .. } => FrameKind::Complete,
            Self::Closing { .. } => FrameKind::Closing,
            Self::Error { .. } => FrameKind::Error,
        }
    }
}

/// Decode one envelope into a typed frame.
///
/// A `chunk` envelope without a `chunk` field decodes to an empty fragment.
/// Non-string `detail` values are rendered to their JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed JSON and
/// [`CodecError::UnknownType`] for an unrecognized `type`.
pub fn decode_frame(data: &str) -> Result<StreamFrame, CodecError> {
    let envelope: Envelope = serde_json::from_str(data)?;
    envelope_to_frame(envelope)
}

/// Encode a frame into its JSON envelope text.
#[must_use]
pub fn encode_frame(frame: &StreamFrame) -> String {
    let envelope = frame_to_envelope(frame);
    // Serializing a struct of strings and `Value`s cannot fail.
    serde_json::to_string(&envelope).unwrap_or_default()
}

fn envelope_to_frame(envelope: Envelope) -> Result<StreamFrame, CodecError> {
    let frame = match FrameKind::parse(&envelope.kind)? {
        FrameKind::Chunk => StreamFrame::Chunk(envelope.chunk.unwrap_or_default()),
        FrameKind::Complete => StreamFrame::Complete { presentation: envelope.presentation },
        FrameKind::Closing => StreamFrame::Closing { presentation: envelope.presentation },
        FrameKind::Error => StreamFrame::Error { detail: envelope.detail.and_then(detail_text) },
    };
    Ok(frame)
}

fn frame_to_envelope(frame: &StreamFrame) -> Envelope {
    let mut envelope = Envelope { kind: frame.kind().as_str().to_owned(), ..Envelope::default() };
    match frame {
        StreamFrame::Chunk(text) => envelope.chunk = Some(text.clone()),
        StreamFrame::Complete { presentation } | StreamFrame::Closing { presentation } => {
            envelope.presentation.clone_from(presentation);
        }
        StreamFrame::Error { detail } => envelope.detail = detail.clone().map(Value::String),
    }
    envelope
}

fn detail_text(detail: Value) -> Option<String> {
    match detail {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
