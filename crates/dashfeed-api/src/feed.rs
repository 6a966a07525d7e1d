//! Content feed with auto-retry.
//!
//! Opens a long-lived server-sent-event stream against the backend's
//! content endpoint and hands each named event to a [`FeedListener`].
//! Transport failures and end-of-stream are reported through
//! [`FeedListener::on_error`] and retried with exponential backoff + jitter,
//! the way a browser `EventSource` retries on its own. Callers never
//! reconnect manually; they only [`close`](FeedHandle::close) the handle.
//!
//! # Example
//!
//! ```rust,ignore
//! use dashfeed_api::feed::{FeedConfig, FeedHandle, FeedListener};
//!
//! let url = client.content_url("/workloads", "default", config.poll_wait)?;
//! let handle = FeedHandle::spawn(stream_http, url, config.reconnect.clone(), listener);
//! // ...
//! handle.close();
//! ```

use std::time::Duration;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::sse::{SseDecoder, SseFrame};

/// Event name carrying a content document.
pub const MESSAGE_EVENT: &str = "message";
/// Event name carrying a navigation tree.
pub const NAVIGATION_EVENT: &str = "navigation";

/// Request header carrying the last seen event id on reconnect.
const LAST_EVENT_ID_HEADER: &str = "Last-Event-ID";

// ── FeedListener ─────────────────────────────────────────────────────

/// Typed callbacks for a single feed connection.
///
/// Fixed when the feed is spawned; a new connection gets a new listener.
pub trait FeedListener: Send + Sync + 'static {
    /// A `message` event with its raw payload.
    fn on_message(&self, data: String);

    /// A `navigation` event with its raw payload.
    fn on_navigation(&self, data: String);

    /// The transport failed or the backend closed the stream.
    /// The feed retries by itself after reporting.
    fn on_error(&self, error: &Error);
}

// ── Config ───────────────────────────────────────────────────────────

/// Exponential backoff configuration for feed reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    /// A server `retry:` hint replaces this value.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum consecutive failures before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

/// Feed tuning consumed by the content URL and the retry loop.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// How often the backend re-polls its object store for this feed.
    /// Sent to the server as the `poll` query parameter.
    pub poll_wait: Duration,
    pub reconnect: ReconnectConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_wait: Duration::from_secs(5),
            reconnect: ReconnectConfig::default(),
        }
    }
}

// ── FeedHandle ───────────────────────────────────────────────────────

/// Handle to a running feed.
///
/// Dropping the handle closes the feed.
#[derive(Debug)]
pub struct FeedHandle {
    cancel: CancellationToken,
}

impl FeedHandle {
    /// Spawn the feed loop on the current tokio runtime.
    ///
    /// Returns immediately; the first connection attempt happens in the
    /// background and failures surface through the listener.
    pub fn spawn<L: FeedListener>(
        http: reqwest::Client,
        url: Url,
        reconnect: ReconnectConfig,
        listener: L,
    ) -> Self {
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            feed_loop(http, url, reconnect, task_cancel, listener).await;
        });

        Self { cancel }
    }

    /// Stop the feed. Idempotent.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background retry loop ────────────────────────────────────────────

/// State carried from one connection attempt to the next.
#[derive(Debug, Default)]
struct Session {
    /// Consecutive failures since the last successful connect.
    attempt: u32,
    /// Latest server `retry:` hint, not yet applied to the policy.
    retry: Option<Duration>,
    /// Last `id:` received, sent back as `Last-Event-ID` on reconnect.
    last_event_id: Option<String>,
}

/// Main loop: connect → read → on failure, report + backoff → reconnect.
async fn feed_loop<L: FeedListener>(
    http: reqwest::Client,
    url: Url,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
    listener: L,
) {
    let mut session = Session::default();
    let mut policy = reconnect;

    loop {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&http, &url, &cancel, &listener, &mut session) => result,
        };

        if let Some(retry) = session.retry.take() {
            policy.initial_delay = retry;
        }

        let Err(e) = result else {
            // Only returned on cancellation.
            break;
        };

        if cancel.is_cancelled() {
            break;
        }

        let attempt = session.attempt;
        tracing::warn!(error = %e, attempt, url = %url, "feed error");
        listener.on_error(&e);

        if let Some(max) = policy.max_retries {
            if attempt >= max {
                tracing::error!(max_retries = max, "feed reconnection limit reached, giving up");
                break;
            }
        }

        let delay = calculate_backoff(attempt, &policy);
        tracing::info!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            attempt,
            "waiting before reconnect"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }

        session.attempt = attempt.saturating_add(1);
    }

    tracing::debug!(url = %url, "feed loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Open the event stream and dispatch frames until it fails or ends.
///
/// Returns `Ok(())` only when cancelled. A stream that ends on its own is
/// [`Error::FeedClosed`]: the backend went away and the loop retries.
async fn connect_and_read<L: FeedListener>(
    http: &reqwest::Client,
    url: &Url,
    cancel: &CancellationToken,
    listener: &L,
    session: &mut Session,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to feed");

    let mut request = http
        .get(url.clone())
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .header(reqwest::header::CACHE_CONTROL, "no-cache");
    // An empty id resets the stream position, so nothing is sent
    if let Some(id) = session.last_event_id.as_deref().filter(|id| !id.is_empty()) {
        request = request.header(LAST_EVENT_ID_HEADER, id);
    }

    let response = request
        .send()
        .await
        .map_err(|e| Error::FeedConnect(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    tracing::info!("feed connected");
    session.attempt = 0;

    let mut bytes = response.bytes_stream();
    let mut decoder = SseDecoder::new();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            chunk = bytes.next() => {
                match chunk {
                    Some(Ok(chunk)) => {
                        for frame in decoder.push(&chunk) {
                            if frame.id.is_some() {
                                session.last_event_id.clone_from(&frame.id);
                            }
                            dispatch(frame, listener);
                        }
                        if let Some(retry) = decoder.retry() {
                            session.retry = Some(retry);
                        }
                    }
                    Some(Err(e)) => return Err(Error::Transport(e)),
                    None => {
                        tracing::info!("feed stream ended");
                        return Err(Error::FeedClosed);
                    }
                }
            }
        }
    }
}

fn dispatch<L: FeedListener>(frame: SseFrame, listener: &L) {
    match frame.event.as_str() {
        MESSAGE_EVENT => listener.on_message(frame.data),
        NAVIGATION_EVENT => listener.on_navigation(frame.data),
        other => tracing::trace!(event = other, "ignoring unknown feed event"),
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) + jitter`
///
/// Jitter is +-25% so that many clients of one backend do not reconnect
/// in lockstep.
#[allow(clippy::cast_possible_wrap, clippy::as_conversions, clippy::cast_possible_truncation)]
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = attempt.min(30) as i32;
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        messages: Mutex<Vec<String>>,
        navigation: Mutex<Vec<String>>,
    }

    impl FeedListener for std::sync::Arc<Recorder> {
        fn on_message(&self, data: String) {
            self.messages.lock().unwrap().push(data);
        }

        fn on_navigation(&self, data: String) {
            self.navigation.lock().unwrap().push(data);
        }

        fn on_error(&self, _error: &Error) {}
    }

    #[test]
    fn default_reconnect_config() {
        let config = ReconnectConfig::default();
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert!(config.max_retries.is_none());
    }

    #[test]
    fn backoff_increases_exponentially() {
        let config = ReconnectConfig::default();

        let d0 = calculate_backoff(0, &config);
        let d1 = calculate_backoff(1, &config);
        let d2 = calculate_backoff(2, &config);

        assert!(d1 > d0, "d1 ({d1:?}) should be greater than d0 ({d0:?})");
        assert!(d2 > d1, "d2 ({d2:?}) should be greater than d1 ({d1:?})");
    }

    #[test]
    fn backoff_caps_at_max_delay() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_retries: None,
        };

        let d10 = calculate_backoff(10, &config);
        // With jitter factor up to 1.25, max effective is 12.5s
        assert!(
            d10 <= Duration::from_secs(13),
            "delay at attempt 10 ({d10:?}) should be capped near max_delay"
        );
    }

    #[test]
    fn backoff_survives_huge_attempt_counts() {
        let config = ReconnectConfig::default();
        let delay = calculate_backoff(u32::MAX, &config);
        assert!(delay <= Duration::from_secs(38));
    }

    #[test]
    fn frames_route_by_event_name() {
        let recorder = std::sync::Arc::new(Recorder::default());

        dispatch(
            SseFrame {
                event: "navigation".into(),
                data: "nav".into(),
                id: None,
            },
            &recorder,
        );
        dispatch(
            SseFrame {
                event: "message".into(),
                data: "doc".into(),
                id: None,
            },
            &recorder,
        );
        dispatch(
            SseFrame {
                event: "heartbeat".into(),
                data: "ignored".into(),
                id: None,
            },
            &recorder,
        );

        assert_eq!(*recorder.messages.lock().unwrap(), vec!["doc".to_string()]);
        assert_eq!(*recorder.navigation.lock().unwrap(), vec!["nav".to_string()]);
    }
}
