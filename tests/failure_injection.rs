//! Failure injection: upstream errors, unreachable upstream, timeouts,
//! bad inbound bodies, and config reload.

use std::time::Duration;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

#[tokio::test]
async fn upstream_error_is_relayed_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cars"))
        .respond_with(ResponseTemplate::new(422).set_body_raw(r#"{"message":"Invalid"}"#, "application/json"))
        .mount(&server)
        .await;
    let gateway = common::spawn_gateway(common::config_for(&server.uri())).await;

    let res = common::client()
        .post(gateway.url("/api/proxy/cars"))
        .header(CONTENT_TYPE, "application/json")
        .body(r#"{"title":""}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(res.text().await.unwrap(), r#"{"message":"Invalid"}"#);
}

#[tokio::test]
async fn unreachable_upstream_yields_500_json() {
    // Nothing listens on port 1.
    let gateway = common::spawn_gateway(common::config_for("http://127.0.0.1:1/api")).await;
    let client = common::client();

    let res = client.get(gateway.url("/api/proxy/cars")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string(), "body: {body}");

    // Still serving afterwards.
    let res = client.get(gateway.url("/healthz")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn slow_upstream_times_out_as_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    let mut config = common::config_for(&server.uri());
    config.upstream.timeout_secs = 1;
    let gateway = common::spawn_gateway(config).await;

    let res = common::client().get(gateway.url("/api/proxy/slow")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("timed out"), "body: {body}");
}

#[tokio::test]
async fn malformed_json_is_not_forwarded() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let gateway = common::spawn_gateway(common::config_for(&server.uri())).await;

    let res = common::client()
        .put(gateway.url("/api/proxy/cars/1"))
        .header(CONTENT_TYPE, "application/json")
        .body(r#"{"price": 12"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("not valid JSON"));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    let mut config = common::config_for(&server.uri());
    config.proxy.max_body_size = 16;
    let gateway = common::spawn_gateway(config).await;

    let res = common::client()
        .post(gateway.url("/api/proxy/cars/1/images"))
        .header(CONTENT_TYPE, "application/octet-stream")
        .body(vec![0u8; 64])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn reload_switches_upstream() {
    let old = MockServer::start().await;
    let new = MockServer::start().await;
    for (server, name) in [(&old, "old"), (&new, "new")] {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "upstream": name })))
            .mount(server)
            .await;
    }

    let gateway = common::spawn_gateway(common::config_for(&old.uri())).await;
    let client = common::client();

    let body: Value = client.get(gateway.url("/api/proxy/ping")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["upstream"], "old");

    gateway.config_updates.send(common::config_for(&new.uri())).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let body: Value = client.get(gateway.url("/api/proxy/ping")).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["upstream"], "new");
}
