// Integration tests for the HTTP backend and a controller running against it.
//
// Uses wiremock to stand in for the dashboard backend, including its
// server-sent-event content feed.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use dashfeed_core::{
    Backend, ControllerConfig, CoreError, HttpBackend, NamespaceOption, SwitchOutcome,
    SyncController, ViewSnapshot,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ControllerConfig) {
    let server = MockServer::start().await;
    let mut config = ControllerConfig::new(Url::parse(&server.uri()).unwrap());
    config.reconnect_initial = Duration::from_millis(50);
    config.reconnect_max = Duration::from_millis(200);
    (server, config)
}

async fn mount_initial_state(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "namespaces": ["default", "apps"] })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/namespace"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "namespace": "default" })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/navigation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sections": [
                {
                    "title": "Overview",
                    "path": "/content/overview/",
                    "children": [{ "title": "Pods", "path": "/content/overview/pods" }]
                },
                { "title": "Config", "path": "/content/config/" }
            ]
        })))
        .mount(server)
        .await;
}

/// Serve a content feed for `namespace` whose single document is titled `title`.
async fn mount_feed(server: &MockServer, namespace: &str, title: &str) {
    let payload = json!({
        "content": {
            "title": [{ "metadata": { "type": "text" }, "config": { "value": title } }],
            "viewComponents": [{ "metadata": { "type": "table" } }]
        }
    });
    let body = format!("event: message\ndata: {payload}\n\n");

    Mock::given(method("GET"))
        .and(path_regex("^/api/v1/content/"))
        .and(query_param("namespace", namespace))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

async fn wait_for(
    controller: &SyncController,
    what: &str,
    pred: impl Fn(&ViewSnapshot) -> bool,
) -> ViewSnapshot {
    let mut rx = controller.subscribe();
    let found = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let view = rx.borrow_and_update().clone();
            if pred(&view) {
                return view;
            }
            rx.changed().await.unwrap();
        }
    })
    .await;
    match found {
        Ok(view) => view,
        Err(_) => panic!("timed out waiting for {what}: {:#?}", controller.snapshot()),
    }
}

fn content_title(view: &ViewSnapshot) -> Option<&str> {
    view.content.as_deref().map(|doc| doc.title())
}

// ── HttpBackend ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_initial_state_combines_namespaces_and_navigation() {
    let (server, config) = setup().await;
    mount_initial_state(&server).await;

    let backend = HttpBackend::connect(&config).unwrap();
    let state = backend.initial_state("/content/overview/pods").await.unwrap();

    assert_eq!(state.title, "Dashboard");
    assert_eq!(
        state.namespace_options,
        vec![NamespaceOption::new("default"), NamespaceOption::new("apps")]
    );
    assert_eq!(state.selected_namespace, Some(NamespaceOption::new("default")));
    assert_eq!(state.navigation.as_ref().unwrap().sections.len(), 2);

    let selected: Vec<_> = state.selection_path.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(selected, ["Overview", "Pods"]);
}

#[tokio::test]
async fn test_initial_state_fails_when_any_part_fails() {
    let (server, config) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let backend = HttpBackend::connect(&config).unwrap();
    let err = backend.initial_state("/").await.unwrap_err();
    assert!(matches!(err, CoreError::Api { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_activate_namespace_posts_the_namespace() {
    let (server, config) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/namespace"))
        .and(body_json(json!({ "namespace": "apps" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::connect(&config).unwrap();
    backend.activate_namespace("apps").await.unwrap();
}

#[tokio::test]
async fn test_rejected_activation_is_an_api_error() {
    let (server, config) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/namespace"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let backend = HttpBackend::connect(&config).unwrap();
    let err = backend.activate_namespace("locked").await.unwrap_err();
    assert!(matches!(err, CoreError::Api { .. }), "unexpected error: {err:?}");
}

// ── Controller over HTTP ────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_controller_follows_root_to_first_section_and_shows_content() {
    let (server, config) = setup().await;
    mount_initial_state(&server).await;
    mount_feed(&server, "default", "Overview").await;

    let controller = SyncController::connect(&config, "/").unwrap();
    let view = wait_for(&controller, "content", |v| content_title(v).is_some()).await;

    assert_eq!(view.path, "/content/overview/");
    assert_eq!(content_title(&view), Some("Overview"));
    assert_eq!(view.selected_namespace, Some(NamespaceOption::new("default")));
    assert!(!view.loading);

    controller.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_namespace_switch_reopens_feed_in_new_namespace() {
    let (server, config) = setup().await;
    mount_initial_state(&server).await;
    mount_feed(&server, "default", "Default pods").await;
    mount_feed(&server, "apps", "App pods").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/namespace"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let controller = SyncController::connect(&config, "/content/overview/pods").unwrap();
    wait_for(&controller, "default content", |v| {
        content_title(v) == Some("Default pods")
    })
    .await;

    let outcome = controller.request_namespace("apps").await.unwrap();
    assert_eq!(
        outcome,
        SwitchOutcome::Committed {
            namespace: "apps".into()
        }
    );

    let view = wait_for(&controller, "apps content", |v| {
        content_title(v) == Some("App pods")
    })
    .await;
    assert_eq!(view.selected_namespace, Some(NamespaceOption::new("apps")));
    assert_eq!(view.path, "/content/overview/pods");

    controller.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_switch_keeps_feed_on_committed_namespace() {
    let (server, config) = setup().await;
    mount_initial_state(&server).await;
    mount_feed(&server, "default", "Default pods").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/namespace"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let controller = SyncController::connect(&config, "/content/overview/pods").unwrap();
    wait_for(&controller, "default content", |v| content_title(v).is_some()).await;

    let outcome = controller.request_namespace("locked").await.unwrap();
    match outcome {
        SwitchOutcome::Failed { namespace, reason } => {
            assert_eq!(namespace, "locked");
            assert!(!reason.is_empty());
        }
        other => panic!("expected a failed switch, got {other:?}"),
    }

    // The feed keeps following the last committed namespace
    wait_for(&controller, "content after failure", |v| {
        content_title(v) == Some("Default pods")
    })
    .await;
    let requests = server.received_requests().await.unwrap();
    assert!(
        requests
            .iter()
            .filter(|r| r.url.path().starts_with("/api/v1/content/"))
            .all(|r| r.url.query_pairs().any(|(k, v)| k == "namespace" && v == "default"))
    );

    controller.shutdown().await;
}
