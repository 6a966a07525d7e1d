use dashfeed_api::{ApiClient, FeedConfig, FeedHandle};
use tracing::debug;

use super::{FeedHandlers, FeedTransport, SubscriptionKey};
use crate::error::CoreError;

/// Server-sent-event feeds against the dashboard backend.
#[derive(Debug, Clone)]
pub struct HttpFeedTransport {
    client: ApiClient,
    config: FeedConfig,
}

impl HttpFeedTransport {
    pub fn new(client: ApiClient, config: FeedConfig) -> Self {
        Self { client, config }
    }
}

impl FeedTransport for HttpFeedTransport {
    type Connection = FeedHandle;

    fn connect(
        &self,
        key: &SubscriptionKey,
        handlers: FeedHandlers,
    ) -> Result<FeedHandle, CoreError> {
        debug!(key = %key, connection = %handlers.connection(), "opening http feed");
        let handle = self
            .client
            .open_feed(&key.path, &key.namespace, &self.config, handlers)?;
        Ok(handle)
    }
}
