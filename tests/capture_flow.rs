// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! End-to-end capture against a local mock server with the real HTTP client

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use netcapture::{
    channel_listener, Body, CaptureConfig, Category, Entry, FailureKind, HttpClient, Network,
    NetworkCapture, ReadyState, Request, RequestKind, SeverityLevel, Subtype,
};
use parking_lot::Mutex;
use reqwest::Method;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup(config: CaptureConfig) -> (Arc<Network>, NetworkCapture) {
    let network = Network::new(HttpClient::new().unwrap());
    let capture = NetworkCapture::new(config).unwrap();
    assert!(capture.start(&network));
    (network, capture)
}

fn by_request_id(entries: &[Entry]) -> HashMap<String, Vec<Subtype>> {
    let mut grouped: HashMap<String, Vec<Subtype>> = HashMap::new();
    for entry in entries {
        let id = entry.request_id().unwrap().to_string();
        grouped.entry(id).or_default().push(entry.subtype);
    }
    grouped
}

#[tokio::test]
async fn test_fetch_produces_request_and_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string(r#"{"ok":true}"#),
        )
        .mount(&server)
        .await;

    let (network, capture) = setup(CaptureConfig::new());
    let url = format!("{}/api/users", server.uri());

    let response = network.fetch(Request::get(&url).unwrap()).await.unwrap();
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text().unwrap(), r#"{"ok":true}"#);

    let entries = capture.entries();
    assert_eq!(entries.len(), 2);

    let request = &entries[0];
    assert_eq!(request.subtype, Subtype::Request);
    assert_eq!(request.category, Category::ApiRequest);
    assert_eq!(request.request.as_ref().unwrap().kind, RequestKind::Fetch);

    let terminal = &entries[1];
    assert_eq!(terminal.subtype, Subtype::Response);
    assert_eq!(terminal.category, Category::ApiSuccess);
    assert_eq!(terminal.severity.as_ref().unwrap().level, SeverityLevel::Low);
    let info = terminal.response.as_ref().unwrap();
    assert_eq!(info.status, 200);
    assert_eq!(info.body.as_deref(), Some(r#"{"ok":true}"#));
    assert!(terminal.timing.unwrap().duration >= 0.0);
    assert_eq!(request.request_id(), terminal.request_id());

    assert_eq!(capture.active_requests(), 0);
}

#[tokio::test]
async fn test_sensitive_data_is_redacted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "sid=abc"))
        .mount(&server)
        .await;

    let (network, capture) = setup(CaptureConfig::new());
    let url = format!("{}/login?password=hunter2&next=home", server.uri());
    let request = Request::post(&url)
        .unwrap()
        .header("Authorization", "Bearer top-secret")
        .json(&serde_json::json!({"user": "me"}))
        .unwrap();
    network.fetch(request).await.unwrap();

    let json = serde_json::to_string(&capture.entries()).unwrap();
    assert!(!json.contains("hunter2"));
    assert!(!json.contains("top-secret"));
    assert!(!json.contains("sid=abc"));
    assert!(json.contains("password=[REDACTED]"));

    let entries = capture.entries();
    assert_eq!(entries[0].category, Category::Authentication);
    let request = entries[0].request.as_ref().unwrap();
    assert_eq!(request.body.as_deref(), Some(r#"{"user":"me"}"#));
}

#[tokio::test]
async fn test_excluded_url_produces_no_entries() {
    let server = MockServer::start().await;
    Mock::given(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = CaptureConfig::new().exclude_pattern("/health$").unwrap();
    let (network, capture) = setup(config);

    let response = network
        .fetch(Request::get(format!("{}/health", server.uri())).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status_code(), 200);
    assert_eq!(capture.queue_len(), 0);
    assert_eq!(capture.stats().requests_intercepted, 0);
}

#[tokio::test]
async fn test_connection_failure_is_classified() {
    let (network, capture) = setup(CaptureConfig::new());

    let result = network
        .fetch(Request::get("http://127.0.0.1:1/api/unreachable").unwrap())
        .await;
    assert!(result.is_err());

    let entries = capture.entries();
    assert_eq!(entries.len(), 2);
    let error = entries[1].error.as_ref().unwrap();
    assert_eq!(error.failure, FailureKind::Network);
    assert_eq!(entries[1].category, Category::NetworkError);
    assert!(entries[1].severity.as_ref().unwrap().score >= 7);
    assert_eq!(capture.active_requests(), 0);
}

#[tokio::test]
async fn test_concurrent_calls_are_correlated() {
    let server = MockServer::start().await;
    for i in 0..10u64 {
        Mock::given(path(format!("/api/items/{}", i)))
            .respond_with(
                ResponseTemplate::new(if i % 3 == 0 { 500 } else { 200 })
                    .set_delay(Duration::from_millis((10 - i) * 15)),
            )
            .mount(&server)
            .await;
    }

    let (network, capture) = setup(CaptureConfig::new());
    let calls = (0..10).map(|i| {
        let network = Arc::clone(&network);
        let url = format!("{}/api/items/{}", server.uri(), i);
        async move { network.fetch(Request::get(url).unwrap()).await }
    });
    let results = futures::future::join_all(calls).await;
    assert!(results.iter().all(|r| r.is_ok()));

    let entries = capture.entries();
    assert_eq!(entries.len(), 20);
    let grouped = by_request_id(&entries);
    assert_eq!(grouped.len(), 10);
    for subtypes in grouped.values() {
        assert_eq!(subtypes, &vec![Subtype::Request, Subtype::Response]);
    }
    let server_errors = entries
        .iter()
        .filter(|e| e.category == Category::ServerError)
        .count();
    assert_eq!(server_errors, 4);
    assert_eq!(capture.active_requests(), 0);
}

#[tokio::test]
async fn test_stop_restores_original_adapters() {
    let network = Network::new(HttpClient::new().unwrap());
    let fetch = network.fetch_client();
    let xhr = network.xhr_backend();

    let capture = NetworkCapture::new(CaptureConfig::new()).unwrap();
    capture.start(&network);
    assert!(!Arc::ptr_eq(&fetch, &network.fetch_client()));
    assert!(!Arc::ptr_eq(&xhr, &network.xhr_backend()));

    capture.stop(&network);
    assert!(Arc::ptr_eq(&fetch, &network.fetch_client()));
    assert!(Arc::ptr_eq(&xhr, &network.xhr_backend()));
}

#[tokio::test]
async fn test_listener_failure_does_not_affect_caller() {
    let server = MockServer::start().await;
    Mock::given(path_regex("^/api/.*"))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .mount(&server)
        .await;

    let (network, capture) = setup(CaptureConfig::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    capture.on_entry(|_| panic!("broken listener"));
    capture.add_listener(channel_listener(tx));

    let response = network
        .fetch(Request::post(format!("{}/api/orders", server.uri())).unwrap().body("{}"))
        .await
        .unwrap();
    assert_eq!(response.status_code(), 201);

    assert_eq!(rx.recv().await.unwrap().subtype, Subtype::Request);
    assert_eq!(rx.recv().await.unwrap().subtype, Subtype::Response);
    assert_eq!(capture.stats().listener_failures, 2);
}

#[tokio::test]
async fn test_xhr_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string(r#"{"hits":3}"#),
        )
        .mount(&server)
        .await;

    let (network, capture) = setup(CaptureConfig::new());
    let states = Arc::new(Mutex::new(Vec::new()));

    let mut xhr = network.xhr();
    let seen = states.clone();
    xhr.on_ready_state_change(move |state| seen.lock().push(state.ready_state()));
    xhr.open(Method::POST, &format!("{}/api/search?api_key=k1", server.uri()))
        .unwrap();
    xhr.set_request_header("X-Api-Key", "k2").unwrap();
    xhr.send(Some(Body::text("q=rust"))).await.unwrap();

    assert_eq!(xhr.ready_state(), ReadyState::Done);
    assert_eq!(xhr.response_text().unwrap(), r#"{"hits":3}"#);
    assert_eq!(states.lock().last(), Some(&ReadyState::Done));

    let entries = capture.entries();
    assert_eq!(entries.len(), 2);
    let request = entries[0].request.as_ref().unwrap();
    assert_eq!(request.kind, RequestKind::Xhr);
    assert!(request.url.contains("api_key=[REDACTED]"));
    assert_eq!(request.headers.as_ref().unwrap()["x-api-key"], "[REDACTED]");
    assert_eq!(request.body.as_deref(), Some("q=rust"));

    let response = entries[1].response.as_ref().unwrap();
    assert_eq!(response.ready_state, Some(4));
    assert_eq!(response.body.as_deref(), Some(r#"{"hits":3}"#));
    assert_eq!(entries[1].category, Category::ApiSuccess);
    assert_eq!(entries[0].request_id(), entries[1].request_id());
    assert_eq!(capture.active_requests(), 0);
}

#[tokio::test]
async fn test_xhr_transport_failure() {
    let (network, capture) = setup(CaptureConfig::new());

    let mut xhr = network.xhr();
    xhr.open(Method::GET, "http://127.0.0.1:1/api/down").unwrap();
    xhr.send(None).await.unwrap();

    assert_eq!(xhr.ready_state(), ReadyState::Done);
    assert_eq!(xhr.status(), 0);
    assert!(xhr.state().error().is_some());

    let entries = capture.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].subtype, Subtype::Error);
    assert_eq!(entries[1].error.as_ref().unwrap().kind, RequestKind::Xhr);
    assert_eq!(capture.active_requests(), 0);
}

#[tokio::test]
async fn test_failure_message_keeps_query_secrets_out() {
    let (network, capture) = setup(CaptureConfig::new());

    let result = network
        .fetch(Request::get("http://127.0.0.1:1/api?token=s3cret").unwrap())
        .await;
    assert!(result.is_err());

    let entries = capture.entries();
    let error = entries[1].error.as_ref().unwrap();
    assert!(error.url.contains("token=[REDACTED]"));
    assert!(!serde_json::to_string(&entries).unwrap().contains("s3cret"));
}

#[tokio::test]
async fn test_xhr_to_bare_origin_is_not_redirected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("home"))
        .mount(&server)
        .await;

    let (network, capture) = setup(CaptureConfig::new());
    let mut xhr = network.xhr();
    xhr.open(Method::GET, &server.uri()).unwrap();
    xhr.send(None).await.unwrap();
    assert_eq!(xhr.status(), 200);

    let entries = capture.entries();
    let response = entries[1].response.as_ref().unwrap();
    assert!(!response.redirected);
    assert_eq!(entries[0].request.as_ref().unwrap().url, format!("{}/", server.uri()));
}
