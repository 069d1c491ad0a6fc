//! Presentation stream client.
//!
//! SYSTEM CONTEXT
//! ==============
//! The [`StreamReconciler`] consumes a presentation's server-sent event
//! stream and commits best-effort snapshots of the growing JSON document to a
//! [`PresentationStore`]. Everything it touches from the outside (transport,
//! store, UI flags, notifications, navigation) sits behind a trait so hosts
//! and tests can supply their own.

pub mod config;
pub mod net;
pub mod state;
pub mod stream;
pub mod util;

pub use config::ClientConfig;
pub use net::event_source::EventSourceTransport;
pub use net::fetch::spawn_fetch_existing_slides;
pub use net::transport::{Connection, ReadyState, Transport, TransportEvent};
pub use state::presentation::{MemoryStore, PresentationStore, StoreSnapshot};
pub use state::ui::{UiFlags, UiSnapshot, UiState};
pub use stream::reconciler::{Collaborators, StartOutcome, StreamReconciler};
pub use stream::repair::{ClosingRepair, JsonRepair, StrictJson, TolerantParser};
pub use util::navigation::{AddressBar, Navigator};
pub use util::notify::{Notifier, TracingNotifier};
