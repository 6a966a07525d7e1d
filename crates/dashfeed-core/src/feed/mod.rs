// ── Feed subscriptions ──
//
// A feed connection is scoped to a `SubscriptionKey`. Connections are
// created through a `FeedTransport` and report back through a
// `FeedHandlers` value bound to them at construction. Every signal carries
// the id of the connection that produced it, so the controller can drop
// anything a closed connection still had in flight.

mod http;
mod manager;

use std::fmt;

use tokio::sync::mpsc;

use crate::error::CoreError;

pub use http::HttpFeedTransport;
pub use manager::FeedSubscriptionManager;

// ── SubscriptionKey ──────────────────────────────────────────────────

/// The (path, namespace) pair identifying which feed to be connected to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    pub path: String,
    pub namespace: String,
}

impl SubscriptionKey {
    pub fn new(path: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            namespace: namespace.into(),
        }
    }

    /// Both parts are required before there is anything to subscribe to.
    pub fn is_subscribable(&self) -> bool {
        !self.path.is_empty() && !self.namespace.is_empty()
    }
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.path, self.namespace)
    }
}

// ── ConnectionId ─────────────────────────────────────────────────────

/// Identity of one feed connection, unique per manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "feed#{}", self.0)
    }
}

// ── Signals ──────────────────────────────────────────────────────────

/// What a connection delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// Raw content payload.
    Message(String),
    /// Raw navigation payload.
    Navigation(String),
    /// Transport failure; the connection keeps retrying by itself.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSignal {
    pub connection: ConnectionId,
    pub event: FeedEvent,
}

// ── FeedHandlers ─────────────────────────────────────────────────────

/// Typed callbacks for one connection.
///
/// Built by the manager when the connection is opened and moved into it;
/// never reassigned. Sends after the controller is gone are ignored.
#[derive(Debug, Clone)]
pub struct FeedHandlers {
    connection: ConnectionId,
    sink: mpsc::UnboundedSender<FeedSignal>,
}

impl FeedHandlers {
    pub(crate) fn new(connection: ConnectionId, sink: mpsc::UnboundedSender<FeedSignal>) -> Self {
        Self { connection, sink }
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    fn emit(&self, event: FeedEvent) {
        let _ = self.sink.send(FeedSignal {
            connection: self.connection,
            event,
        });
    }
}

impl dashfeed_api::FeedListener for FeedHandlers {
    fn on_message(&self, data: String) {
        self.emit(FeedEvent::Message(data));
    }

    fn on_navigation(&self, data: String) {
        self.emit(FeedEvent::Navigation(data));
    }

    fn on_error(&self, error: &dashfeed_api::Error) {
        self.emit(FeedEvent::Error(error.to_string()));
    }
}

// ── Transport seam ───────────────────────────────────────────────────

/// Creates feed connections. Implemented over HTTP/SSE by
/// [`HttpFeedTransport`]; tests substitute an in-memory transport.
pub trait FeedTransport: Send + 'static {
    type Connection: FeedConnection;

    /// Start a connection for `key`. Must not block: establishing the
    /// stream and every later failure are reported through `handlers`.
    fn connect(
        &self,
        key: &SubscriptionKey,
        handlers: FeedHandlers,
    ) -> Result<Self::Connection, CoreError>;
}

/// A live connection.
pub trait FeedConnection: Send + 'static {
    /// Terminate the connection and release its handlers. Idempotent.
    fn close(&mut self);
}

impl FeedConnection for dashfeed_api::FeedHandle {
    fn close(&mut self) {
        dashfeed_api::FeedHandle::close(self);
    }
}
