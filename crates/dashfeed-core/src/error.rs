// ── Core error types ──
//
// User-facing errors from dashfeed-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<dashfeed_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Backend request timed out")]
    Timeout,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Namespace errors ─────────────────────────────────────────────
    #[error("Could not switch to namespace '{namespace}': {reason}")]
    NamespaceActivation { namespace: String, reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Synchronization controller has been shut down")]
    ControllerStopped,

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<dashfeed_api::Error> for CoreError {
    fn from(err: dashfeed_api::Error) -> Self {
        match err {
            dashfeed_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            dashfeed_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            dashfeed_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            dashfeed_api::Error::Api { status, message } => CoreError::Api {
                message: if message.is_empty() {
                    format!("HTTP {status}")
                } else {
                    message
                },
                status: Some(status),
            },
            dashfeed_api::Error::FeedConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("feed connection failed: {reason}"),
            },
            dashfeed_api::Error::FeedClosed => CoreError::ConnectionFailed {
                url: String::new(),
                reason: "feed closed by the backend".into(),
            },
            dashfeed_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
