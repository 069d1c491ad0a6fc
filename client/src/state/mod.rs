//! Externally owned state the reconciler writes into.

pub mod presentation;
pub mod ui;
