// ── Runtime connection configuration ──
//
// These types describe *how* to reach the dashboard backend and how the
// content feed behaves. They never touch disk: the CLI constructs a
// `ControllerConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use dashfeed_api::{FeedConfig, ReconnectConfig, TlsMode, TransportConfig};
use url::Url;

/// Title shown until the backend provides one.
pub const DEFAULT_TITLE: &str = "Dashboard";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one synchronization controller.
///
/// Built by the CLI, passed to `SyncController::connect`.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Backend root (e.g., `http://127.0.0.1:7777`).
    pub api_base: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout for REST calls. Feeds have no overall timeout.
    pub timeout: Duration,
    /// Page title.
    pub title: String,
    /// How long the backend waits between content polls for a feed.
    pub poll_wait: Duration,
    /// First reconnect delay after a feed failure.
    pub reconnect_initial: Duration,
    /// Upper bound on the reconnect delay.
    pub reconnect_max: Duration,
    /// Give up reconnecting after this many consecutive failures.
    pub max_retries: Option<u32>,
}

impl ControllerConfig {
    /// Default tuning against `api_base`.
    pub fn new(api_base: Url) -> Self {
        Self {
            api_base,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            title: DEFAULT_TITLE.into(),
            poll_wait: Duration::from_secs(5),
            reconnect_initial: Duration::from_secs(1),
            reconnect_max: Duration::from_secs(30),
            max_retries: None,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: tls_to_transport(&self.tls),
            timeout: self.timeout,
        }
    }

    pub(crate) fn feed(&self) -> FeedConfig {
        FeedConfig {
            poll_wait: self.poll_wait,
            reconnect: ReconnectConfig {
                initial_delay: self.reconnect_initial,
                max_delay: self.reconnect_max.max(self.reconnect_initial),
                max_retries: self.max_retries,
            },
        }
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> ControllerConfig {
        ControllerConfig::new(Url::parse("http://127.0.0.1:7777").unwrap())
    }

    #[test]
    fn feed_tuning_carries_over() {
        let mut cfg = config();
        cfg.poll_wait = Duration::from_secs(2);
        cfg.max_retries = Some(4);

        let feed = cfg.feed();
        assert_eq!(feed.poll_wait, Duration::from_secs(2));
        assert_eq!(feed.reconnect.initial_delay, Duration::from_secs(1));
        assert_eq!(feed.reconnect.max_retries, Some(4));
    }

    #[test]
    fn max_delay_never_below_initial() {
        let mut cfg = config();
        cfg.reconnect_initial = Duration::from_secs(10);
        cfg.reconnect_max = Duration::from_secs(2);
        assert_eq!(cfg.feed().reconnect.max_delay, Duration::from_secs(10));
    }

    #[test]
    fn tls_mode_translation() {
        let mut cfg = config();
        cfg.tls = TlsVerification::DangerAcceptInvalid;
        cfg.timeout = Duration::from_secs(3);

        let transport = cfg.transport();
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(transport.timeout, Duration::from_secs(3));
    }
}
