//! Integration tests for authentication and request dispatch against a mock
//! Metabase instance.

use std::sync::Arc;
use std::time::Duration;

use mbgate_client::{
    AuthKind, GatewayClient, GatewayConfig, GatewayError, HttpMethod, DEFAULT_TIMEOUT,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn login_config(server: &MockServer) -> GatewayConfig {
    GatewayConfig::new(&server.uri())
        .unwrap()
        .with_login("admin@example.com", "secret")
}

async fn mount_login(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/session"))
        .and(body_json(
            json!({"username": "admin@example.com", "password": "secret"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": token })))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn api_key_takes_precedence_and_never_logs_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "unused"})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .and(header("X-API-Key", "k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = GatewayClient::new(
        login_config(&server)
            .with_session_token("ignored")
            .with_api_key("k"),
    )
    .unwrap();
    assert_eq!(client.auth_kind(), AuthKind::ApiKey);
    assert!(client.is_authenticated());

    let dashboards = client.list_dashboards(None).await.unwrap();
    assert_eq!(dashboards, json!([]));
}

#[tokio::test]
async fn session_token_mode_sends_session_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/current"))
        .and(header("X-Metabase-Session", "existing-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let client = GatewayClient::new(
        login_config(&server).with_session_token("existing-token"),
    )
    .unwrap();
    assert_eq!(client.auth_kind(), AuthKind::SessionToken);
    assert!(client.is_authenticated());

    assert_eq!(client.current_user().await.unwrap()["id"], 1);
}

#[tokio::test]
async fn missing_credentials_fail_before_any_request() {
    let server = MockServer::start().await;

    let err = GatewayClient::new(GatewayConfig::new(&server.uri()).unwrap()).unwrap_err();

    assert!(matches!(err, GatewayError::Config(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn lazy_login_happens_once() {
    let server = MockServer::start().await;
    mount_login(&server, "tok123", 1).await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .and(header("X-Metabase-Session", "tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7}])))
        .expect(2)
        .mount(&server)
        .await;

    let client = GatewayClient::new(login_config(&server)).unwrap();
    assert_eq!(client.auth_kind(), AuthKind::Login);
    assert!(!client.is_authenticated());

    client.list_dashboards(None).await.unwrap();
    assert!(client.is_authenticated());
    let second = client.list_dashboards(None).await.unwrap();
    assert_eq!(second[0]["id"], 7);
}

#[tokio::test]
async fn direct_session_call_bypasses_the_guard() {
    let server = MockServer::start().await;
    mount_login(&server, "direct", 1).await;

    let client = GatewayClient::new(login_config(&server)).unwrap();
    let response = client
        .call(
            HttpMethod::Post,
            "/api/session",
            Some(json!({"username": "admin@example.com", "password": "secret"})),
        )
        .await
        .unwrap();

    assert_eq!(response["id"], "direct");
    // The caller received the session; the client's own state is untouched.
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn failed_login_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/session"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"errors": {"password": "did not match"}})),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/database"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let client = GatewayClient::new(login_config(&server)).unwrap();

    let first = client.list_databases(false).await.unwrap_err();
    assert!(first.is_authentication(), "unexpected error: {first}");
    assert!(first.to_string().contains("401"));
    assert!(!client.is_authenticated());

    let second = client.list_databases(false).await.unwrap_err();
    assert!(second.is_authentication());
}

#[tokio::test]
async fn login_without_session_id_is_an_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = GatewayClient::new(login_config(&server)).unwrap();
    let err = client.get("/api/card").await.unwrap_err();

    assert!(err.is_authentication());
    assert!(err.to_string().contains("session id"));
}

#[tokio::test]
async fn login_with_unsendable_session_id_is_an_authentication_error() {
    let server = MockServer::start().await;
    mount_login(&server, "tok\u{7f}123", 1).await;

    let client = GatewayClient::new(login_config(&server)).unwrap();
    let err = client.list_dashboards(None).await.unwrap_err();

    assert!(err.is_authentication(), "got {err}");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn concurrent_first_calls_all_succeed() {
    let server = MockServer::start().await;
    // Each first call may log in on its own; at least one must.
    Mock::given(method("POST"))
        .and(path("/api/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "tok123"})))
        .expect(1..=3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/card"))
        .and(header("X-Metabase-Session", "tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(3)
        .mount(&server)
        .await;

    let client = Arc::new(GatewayClient::new(login_config(&server)).unwrap());
    let (a, b, c) = tokio::join!(
        client.list_cards(None, None),
        client.list_cards(None, None),
        client.list_cards(None, None)
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn generic_call_passes_json_through() {
    let server = MockServer::start().await;
    let databases = json!({
        "data": [{"id": 1, "name": "Sample Database", "engine": "h2"}],
        "total": 1
    });
    Mock::given(method("GET"))
        .and(path("/api/database"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&databases))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/card"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "x"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 99, "name": "x"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = GatewayClient::new(
        GatewayConfig::new(&server.uri()).unwrap().with_api_key("k"),
    )
    .unwrap();

    let listed = client
        .call(HttpMethod::Get, "/api/database", None)
        .await
        .unwrap();
    assert_eq!(listed, databases);

    let created = client
        .call(HttpMethod::Post, "/api/card", Some(json!({"name": "x"})))
        .await
        .unwrap();
    assert_eq!(created["id"], 99);
}

#[tokio::test]
async fn upstream_errors_carry_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/card/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found."})))
        .mount(&server)
        .await;

    let client = GatewayClient::new(
        GatewayConfig::new(&server.uri()).unwrap().with_api_key("k"),
    )
    .unwrap();
    let err = client.get_card(404).await.unwrap_err();

    match err {
        GatewayError::Upstream { status, message } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(message, "Not found.");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn upstream_401_is_not_retried_with_a_new_login() {
    let server = MockServer::start().await;
    mount_login(&server, "expired", 1).await;
    Mock::given(method("GET"))
        .and(path("/api/user/current"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthenticated"))
        .expect(2)
        .mount(&server)
        .await;

    let client = GatewayClient::new(login_config(&server)).unwrap();
    for _ in 0..2 {
        let err = client.current_user().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/card/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = GatewayClient::new(
        GatewayConfig::new(&server.uri()).unwrap().with_api_key("k"),
    )
    .unwrap();

    assert_eq!(client.delete_card(3).await.unwrap(), Value::Null);
}

#[tokio::test]
async fn non_json_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let client = GatewayClient::new(
        GatewayConfig::new(&server.uri()).unwrap().with_api_key("k"),
    )
    .unwrap();

    let err = client.get("/api/health").await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode { .. }));
}

#[tokio::test]
async fn unresponsive_endpoint_times_out() {
    assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));

    let server = MockServer::start().await;
    let default_client = GatewayClient::new(
        GatewayConfig::new(&server.uri()).unwrap().with_api_key("k"),
    )
    .unwrap();
    assert_eq!(default_client.timeout(), Duration::from_secs(30));

    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = GatewayClient::new(
        GatewayConfig::new(&server.uri())
            .unwrap()
            .with_api_key("k")
            .with_timeout(Duration::from_millis(200)),
    )
    .unwrap();

    let err = client.list_dashboards(None).await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err}");
}

#[tokio::test]
async fn login_timeout_surfaces_as_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/session"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "late"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = GatewayClient::new(
        login_config(&server).with_timeout(Duration::from_millis(200)),
    )
    .unwrap();

    let err = client.list_tables().await.unwrap_err();
    assert!(err.is_authentication());
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn base_url_prefix_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metabase/api/database/2"))
        .and(header("X-API-Key", "k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let client = GatewayClient::new(
        GatewayConfig::new(&format!("{}/metabase", server.uri()))
            .unwrap()
            .with_api_key("k"),
    )
    .unwrap();

    assert_eq!(client.get_database(2).await.unwrap()["id"], 2);
}
