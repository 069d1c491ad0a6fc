//! Incremental presentation streaming.
//!
//! SYSTEM CONTEXT
//! ==============
//! `repair` turns a growing, truncated JSON buffer into a best-effort value;
//! `reconciler` owns the stream session and decides when a value is worth
//! committing to the presentation store.

pub mod reconciler;
pub mod repair;
