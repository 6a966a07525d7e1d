// dashfeed-core: Live-content synchronization engine between dashfeed-api and consumers (CLI).

pub mod backend;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod feed;
pub mod model;
pub mod namespace;

#[cfg(test)]
mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{Backend, HttpBackend, InitialState, NamespaceListing};
pub use config::{ControllerConfig, DEFAULT_TITLE, TlsVerification};
pub use controller::{DEFAULT_ERROR_MESSAGE, FEED_GONE_MESSAGE, SyncController, ViewSnapshot};
pub use error::CoreError;
pub use feed::{
    ConnectionId, FeedConnection, FeedEvent, FeedHandlers, FeedSignal, FeedSubscriptionManager,
    FeedTransport, HttpFeedTransport, SubscriptionKey,
};
pub use namespace::{NamespaceSwitchCoordinator, SwitchOutcome, SwitchTicket};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ContentDocument, DEFAULT_NAMESPACE, FALLBACK_ROOT_PATH, NamespaceOption, NavigationSection,
    NavigationTree, ParseError, resolve_route,
};
