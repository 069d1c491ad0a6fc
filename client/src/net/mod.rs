//! Networking for the presentation stream.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` defines the connection seam the reconciler drives,
//! `event_source` implements it over HTTP server-sent events, and `fetch`
//! loads an already generated presentation over REST.

pub mod event_source;
pub mod fetch;
pub mod transport;
