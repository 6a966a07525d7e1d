// ── Feed subscription manager ──
//
// Exclusive owner of the single connection slot. The slot is only touched
// through `open` / `replace` / `close`, all of which take `&mut self`, so a
// close-then-open pair can never be observed half-done.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{
    ConnectionId, FeedConnection, FeedEvent, FeedHandlers, FeedSignal, FeedTransport,
    SubscriptionKey,
};

struct ActiveFeed<C> {
    id: ConnectionId,
    key: SubscriptionKey,
    /// `None` when the transport refused to start; the failure has already
    /// been reported through the sink.
    connection: Option<C>,
}

/// Owns at most one feed connection at a time.
pub struct FeedSubscriptionManager<T: FeedTransport> {
    transport: T,
    sink: mpsc::UnboundedSender<FeedSignal>,
    next_id: u64,
    active: Option<ActiveFeed<T::Connection>>,
}

impl<T: FeedTransport> FeedSubscriptionManager<T> {
    /// Signals from every connection this manager opens go to `sink`.
    pub fn new(transport: T, sink: mpsc::UnboundedSender<FeedSignal>) -> Self {
        Self {
            transport,
            sink,
            next_id: 0,
            active: None,
        }
    }

    /// Open a connection for `key`, closing any live one first.
    ///
    /// Returns `None` without connecting when either part of the key is
    /// empty. Never fails: a transport that cannot start reports through
    /// the error handler instead.
    pub fn open(&mut self, key: SubscriptionKey) -> Option<ConnectionId> {
        self.close();

        if !key.is_subscribable() {
            debug!(key = %key, "nothing to subscribe to yet");
            return None;
        }

        self.next_id += 1;
        let id = ConnectionId(self.next_id);
        let handlers = FeedHandlers::new(id, self.sink.clone());

        let connection = match self.transport.connect(&key, handlers) {
            Ok(connection) => {
                info!(key = %key, connection = %id, "feed opened");
                Some(connection)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "feed could not be started");
                let _ = self.sink.send(FeedSignal {
                    connection: id,
                    event: FeedEvent::Error(e.to_string()),
                });
                None
            }
        };

        self.active = Some(ActiveFeed {
            id,
            key,
            connection,
        });
        Some(id)
    }

    /// Switch to `key`. A no-op returning the current id when `key` is
    /// already the live subscription.
    pub fn replace(&mut self, key: SubscriptionKey) -> Option<ConnectionId> {
        if let Some(active) = &self.active {
            if active.key == key {
                debug!(key = %key, "subscription unchanged, keeping connection");
                return Some(active.id);
            }
        }
        self.open(key)
    }

    /// Close the live connection, if any. Returns whether one was closed.
    pub fn close(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };

        if let Some(mut connection) = active.connection {
            connection.close();
        }
        info!(key = %active.key, connection = %active.id, "feed closed");
        true
    }

    pub fn current(&self) -> Option<ConnectionId> {
        self.active.as_ref().map(|a| a.id)
    }

    /// Whether signals from `id` still describe the displayed subscription.
    pub fn is_current(&self, id: ConnectionId) -> bool {
        self.current() == Some(id)
    }

    /// Whether a transport connection is live.
    pub fn is_open(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.connection.is_some())
    }
}

impl<T: FeedTransport> Drop for FeedSubscriptionManager<T> {
    fn drop(&mut self) {
        self.close();
    }
}
