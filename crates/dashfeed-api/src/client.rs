// Dashboard API HTTP client
//
// Wraps `reqwest::Client` with URL construction for the `/api/v1` surface,
// status checking, and body decoding. The content feed uses a second
// client without a request timeout, since a feed never completes.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::feed::{FeedConfig, FeedHandle, FeedListener};
use crate::models::{NamespaceBody, NamespacesResponse, NavigationPayload};
use crate::transport::TransportConfig;

const API_PREFIX: &str = "api/v1";

/// Raw HTTP client for the dashboard backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    stream_http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root, e.g. `http://127.0.0.1:7777`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            stream_http: transport.build_stream_client()?,
            base_url,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`, used for both
    /// REST calls and feeds.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            stream_http: http.clone(),
            http,
            base_url,
        }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/api/v1/{path}`
    pub fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{API_PREFIX}/{path}"))?)
    }

    /// Content feed URL for a resource path in a namespace:
    /// `{base}/api/v1/content{path}?namespace={ns}&poll={secs}`
    pub fn content_url(
        &self,
        content_path: &str,
        namespace: &str,
        poll_wait: Duration,
    ) -> Result<Url, Error> {
        let content_path = content_path.trim_start_matches('/');
        let mut url = self.api_url(&format!("content/{content_path}"))?;
        url.query_pairs_mut()
            .append_pair("namespace", namespace)
            .append_pair("poll", &poll_wait.as_secs().max(1).to_string());
        Ok(url)
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// List the namespaces the backend can scope content to.
    pub async fn namespaces(&self) -> Result<Vec<String>, Error> {
        let body: NamespacesResponse = self.get(self.api_url("namespaces")?).await?;
        Ok(body.namespaces)
    }

    /// The namespace the backend currently resolves resources in.
    pub async fn current_namespace(&self) -> Result<String, Error> {
        let body: NamespaceBody = self.get(self.api_url("namespace")?).await?;
        Ok(body.namespace)
    }

    /// Make `namespace` the backend default for subsequent resolution.
    pub async fn set_namespace(&self, namespace: &str) -> Result<(), Error> {
        let url = self.api_url("namespace")?;
        debug!("POST {url} namespace={namespace}");

        let resp = self
            .http
            .post(url)
            .json(&NamespaceBody {
                namespace: namespace.to_owned(),
            })
            .send()
            .await?;

        check_status(resp).await.map(drop)
    }

    /// The navigation tree for the current namespace.
    pub async fn navigation(&self) -> Result<NavigationPayload, Error> {
        self.get(self.api_url("navigation")?).await
    }

    /// Open a content feed for `content_path` in `namespace`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open_feed<L: FeedListener>(
        &self,
        content_path: &str,
        namespace: &str,
        config: &FeedConfig,
        listener: L,
    ) -> Result<FeedHandle, Error> {
        let url = self.content_url(content_path, namespace, config.poll_wait)?;
        Ok(FeedHandle::spawn(
            self.stream_http.clone(),
            url,
            config.reconnect.clone(),
            listener,
        ))
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        let body = check_status(resp).await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// Fail on non-2xx, otherwise return the body text.
async fn check_status(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();
    let body = resp.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(Error::Api {
            status: status.as_u16(),
            message: body,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn api_url_tolerates_slashes() {
        let c = client("http://localhost:7777/");
        assert_eq!(
            c.api_url("/namespaces").unwrap().as_str(),
            "http://localhost:7777/api/v1/namespaces"
        );
    }

    #[test]
    fn content_url_carries_namespace_and_poll() {
        let c = client("http://localhost:7777");
        let url = c
            .content_url("/overview/workloads", "kube-system", Duration::from_secs(5))
            .unwrap();
        assert_eq!(url.path(), "/api/v1/content/overview/workloads");
        assert_eq!(url.query(), Some("namespace=kube-system&poll=5"));
    }

    #[test]
    fn content_url_never_sends_zero_poll() {
        let c = client("http://localhost:7777");
        let url = c.content_url("/", "default", Duration::ZERO).unwrap();
        assert_eq!(url.query(), Some("namespace=default&poll=1"));
    }
}
