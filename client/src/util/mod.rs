//! Page-side helpers the reconciler calls out to.

pub mod navigation;
pub mod notify;
