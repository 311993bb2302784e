use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::store::{self, Store};
use mock_server::{app, app_with_state, Db};
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn authed(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Auth-Email", store::EMAIL)
        .header("X-Auth-Key", store::API_KEY)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn record_uri(record_id: &str) -> String {
    format!("/client/v4/zones/{}/dns_records/{record_id}", store::ZONE_ID)
}

fn assert_failure(json: &Value, code: i64) {
    assert_eq!(json["success"], false);
    assert_eq!(json["errors"][0]["code"], code);
    assert!(json["result"].is_null());
}

// --- auth ---

#[tokio::test]
async fn missing_credentials_are_rejected() {
    let resp = app()
        .oneshot(Request::builder().uri("/client/v4/user").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_failure(&body_json(resp).await, 9103);
}

#[tokio::test]
async fn wrong_key_is_rejected() {
    let req = Request::builder()
        .uri("/client/v4/user")
        .header("X-Auth-Email", store::EMAIL)
        .header("X-Auth-Key", "wrong")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// --- zones ---

#[tokio::test]
async fn zone_lookup_by_name() {
    let resp = app()
        .oneshot(authed("GET", "/client/v4/zones?name=example.com", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["result"].as_array().unwrap().len(), 1);
    assert_eq!(json["result"][0]["id"], store::ZONE_ID);
    assert!(json["result"][0]["original_registrar"].is_null());
}

#[tokio::test]
async fn zone_lookup_unknown_name_is_empty() {
    let resp = app()
        .oneshot(authed("GET", "/client/v4/zones?name=other.org", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert!(json["result"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn zone_lookup_invalid_name() {
    let resp = app()
        .oneshot(authed("GET", "/client/v4/zones?name=bad..name", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_failure(&body_json(resp).await, 1003);
}

// --- records ---

#[tokio::test]
async fn records_filtered_by_name_and_type() {
    let uri = format!(
        "/client/v4/zones/{}/dns_records?match=all&name=example.com&type=TXT",
        store::ZONE_ID
    );
    let resp = app().oneshot(authed("GET", &uri, "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let records = json["result"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], store::TXT_RECORD_ID);
}

#[tokio::test]
async fn records_without_filter_list_zone() {
    let uri = format!("/client/v4/zones/{}/dns_records", store::ZONE_ID);
    let resp = app().oneshot(authed("GET", &uri, "")).await.unwrap();

    let json = body_json(resp).await;
    assert_eq!(json["result"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn records_unknown_zone_returns_404() {
    let resp = app()
        .oneshot(authed("GET", "/client/v4/zones/nope/dns_records?match=all", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = body_json(resp).await;
    assert_failure(&json, 7003);
    assert!(json["errors"][0]["message"].as_str().unwrap().contains("/zones/nope/dns_records"));
}

// --- update ---

#[tokio::test]
async fn update_record_applies_body() {
    let body = r#"{"type":"A","name":"www.example.com","content":"203.0.113.9","ttl":120,"proxied":false}"#;
    let resp = app()
        .oneshot(authed("PUT", &record_uri(store::WWW_RECORD_ID), body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["result"]["content"], "203.0.113.9");
    assert_eq!(json["result"]["ttl"], 120);
    assert_eq!(json["result"]["proxied"], false);
    assert_ne!(json["result"]["modified_on"], json["result"]["created_on"]);
}

#[tokio::test]
async fn update_record_persists() {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    let body = r#"{"type":"TXT","name":"example.com","content":"v=spf1 include:_spf.example.net -all","ttl":300}"#;
    let resp = app_with_state(db.clone())
        .oneshot(authed("PUT", &record_uri(store::TXT_RECORD_ID), body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let state = db.read().await;
    let record = state.records.iter().find(|r| r.id == store::TXT_RECORD_ID).unwrap();
    assert_eq!(record.content, "v=spf1 include:_spf.example.net -all");
    assert_eq!(state.requests.len(), 1);
    assert_eq!(state.requests[0].method, "PUT");
    assert_eq!(state.requests[0].body, body.as_bytes());
}

#[tokio::test]
async fn update_record_invalid_json() {
    let resp = app()
        .oneshot(authed("PUT", &record_uri(store::WWW_RECORD_ID), "not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_failure(&body_json(resp).await, 9207);
}

#[tokio::test]
async fn update_record_bad_ttl_has_error_chain() {
    let body = r#"{"type":"A","name":"www.example.com","content":"203.0.113.9","ttl":5}"#;
    let resp = app()
        .oneshot(authed("PUT", &record_uri(store::WWW_RECORD_ID), body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_failure(&json, 1004);
    assert_eq!(json["errors"][0]["error_chain"][0]["code"], 9021);
}

#[tokio::test]
async fn update_record_not_found() {
    let body = r#"{"type":"A","name":"www.example.com","content":"203.0.113.9"}"#;
    let resp = app()
        .oneshot(authed("PUT", &record_uri("00000000000000000000000000000000"), body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_failure(&body_json(resp).await, 81044);
}

// --- user ---

#[tokio::test]
async fn user_profile() {
    let resp = app().oneshot(authed("GET", "/client/v4/user", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["result"]["email"], store::EMAIL);
    assert_eq!(json["result"]["two_factor_authentication_enabled"], false);
    assert!(json["result"]["telephone"].is_null());
}

#[tokio::test]
async fn requests_are_logged_with_headers() {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    let resp = app_with_state(db.clone())
        .oneshot(authed("GET", "/client/v4/zones?name=example.com", ""))
        .await
        .unwrap();
    let _ = body_bytes(resp).await;

    let state = db.read().await;
    let logged = &state.requests[0];
    assert_eq!(logged.path_and_query, "/client/v4/zones?name=example.com");
    assert_eq!(logged.auth_email.as_deref(), Some(store::EMAIL));
    assert_eq!(logged.auth_key.as_deref(), Some(store::API_KEY));
    assert_eq!(logged.content_type.as_deref(), Some("application/json"));
    assert!(logged.body.is_empty());
}
