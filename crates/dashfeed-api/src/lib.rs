// dashfeed-api: Async Rust client for the dashboard content API (REST + SSE feed)

pub mod client;
pub mod error;
pub mod feed;
pub mod models;
pub mod sse;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use feed::{FeedConfig, FeedHandle, FeedListener, ReconnectConfig};
pub use models::{NavigationPayload, NavigationSectionPayload};
pub use transport::{TlsMode, TransportConfig};
