#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dashfeed_api::{ApiClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

// ── Namespace tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_list_namespaces() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "namespaces": ["default", "kube-system"] })),
        )
        .mount(&server)
        .await;

    let namespaces = client.namespaces().await.unwrap();
    assert_eq!(namespaces, vec!["default", "kube-system"]);
}

#[tokio::test]
async fn test_current_namespace() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/namespace"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "namespace": "apps" })))
        .mount(&server)
        .await;

    assert_eq!(client.current_namespace().await.unwrap(), "apps");
}

#[tokio::test]
async fn test_set_namespace_posts_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/namespace"))
        .and(body_json(json!({ "namespace": "kube-system" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.set_namespace("kube-system").await.unwrap();
}

#[tokio::test]
async fn test_set_namespace_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/namespace"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let result = client.set_namespace("nope").await;
    assert!(
        matches!(result, Err(Error::Api { status: 500, ref message }) if message == "backend exploded"),
        "expected Api error, got: {result:?}"
    );
}

// ── Navigation tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_navigation_tree() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/navigation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sections": [{
                "title": "Overview",
                "path": "/content/overview/",
                "children": [
                    { "title": "Workloads", "path": "/content/overview/workloads" }
                ]
            }]
        })))
        .mount(&server)
        .await;

    let nav = client.navigation().await.unwrap();
    assert_eq!(nav.sections.len(), 1);
    assert_eq!(nav.sections[0].path, "/content/overview/");
    assert_eq!(nav.sections[0].children[0].title, "Workloads");
    assert!(nav.sections[0].children[0].children.is_empty());
}

#[tokio::test]
async fn test_malformed_body_keeps_raw_text() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/navigation"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.navigation().await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "<html>oops</html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
