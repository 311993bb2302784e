//! A stand-in for the Cloudflare v4 DNS API.
//!
//! Serves the zone lookup, record listing, record update and user endpoints
//! from an in-memory `Store`, wrapping every answer in the usual
//! `{success, errors, messages, result}` envelope. Every request is appended
//! to `Store::requests` so tests can check what actually went over the wire.

pub mod store;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub use store::{DnsRecord, RecordUpdate, RecordedRequest, Store, User, Zone};

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with_state(Arc::new(RwLock::new(Store::seeded())))
}

/// Router over caller-owned state, so a test can keep a handle to the store.
pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/client/v4/zones", get(list_zones))
        .route("/client/v4/zones/{zone_id}/dns_records", get(list_records))
        .route("/client/v4/zones/{zone_id}/dns_records/{record_id}", put(update_record))
        .route("/client/v4/user", get(get_user))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

#[derive(Deserialize)]
pub struct ZoneQuery {
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct RecordQuery {
    #[serde(rename = "match")]
    pub match_mode: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub record_type: Option<String>,
}

async fn list_zones(
    State(db): State<Db>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<ZoneQuery>,
) -> Response {
    if let Err(rejection) = authorize(&db, &method, &uri, &headers, &[]).await {
        return rejection;
    }
    let Some(name) = query.name.filter(|n| is_valid_domain(n)) else {
        return failure(StatusCode::BAD_REQUEST, 1003, "Invalid zone");
    };
    let store = db.read().await;
    let zones: Vec<Zone> = store.zones.iter().filter(|z| z.name == name).cloned().collect();
    success(zones)
}

async fn list_records(
    State(db): State<Db>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(zone_id): Path<String>,
    Query(query): Query<RecordQuery>,
) -> Response {
    if let Err(rejection) = authorize(&db, &method, &uri, &headers, &[]).await {
        return rejection;
    }
    let store = db.read().await;
    if store.zone(&zone_id).is_none() {
        return unknown_zone(&uri);
    }
    let records: Vec<DnsRecord> = store
        .records
        .iter()
        .filter(|r| r.zone_id == zone_id && matches_filter(r, &query))
        .cloned()
        .collect();
    success(records)
}

async fn update_record(
    State(db): State<Db>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path((zone_id, record_id)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    if let Err(rejection) = authorize(&db, &method, &uri, &headers, &body).await {
        return rejection;
    }
    let mut store = db.write().await;
    if store.zone(&zone_id).is_none() {
        return unknown_zone(&uri);
    }
    let input: RecordUpdate = match serde_json::from_slice(&body) {
        Ok(input) => input,
        Err(_) => return failure(StatusCode::BAD_REQUEST, 9207, "Request body is invalid."),
    };
    if input.ttl != 1 && !(60..=86400).contains(&input.ttl) {
        return failure_with_chain(
            StatusCode::BAD_REQUEST,
            1004,
            "DNS Validation Error",
            &[(9021, "Invalid TTL. Must be between 60 and 86400 seconds, or 1 for Automatic.")],
        );
    }
    let Some(record) = store
        .records
        .iter_mut()
        .find(|r| r.zone_id == zone_id && r.id == record_id)
    else {
        return failure(StatusCode::NOT_FOUND, 81044, "Record does not exist.");
    };
    record.record_type = input.record_type;
    record.name = input.name;
    record.content = input.content;
    record.ttl = input.ttl;
    record.proxied = input.proxied.unwrap_or(false);
    record.comment = input.comment;
    record.modified_on = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    success(record.clone())
}

async fn get_user(State(db): State<Db>, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&db, &method, &uri, &headers, &[]).await {
        return rejection;
    }
    let store = db.read().await;
    success(store.user.clone())
}

/// Log the request, then check the `X-Auth-Email` / `X-Auth-Key` pair.
async fn authorize(
    db: &Db,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), Response> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let recorded = RecordedRequest {
        method: method.to_string(),
        path_and_query: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
        auth_email: header("x-auth-email"),
        auth_key: header("x-auth-key"),
        content_type: header("content-type"),
        body: body.to_vec(),
    };

    let mut store = db.write().await;
    let authorized = recorded.auth_email.as_deref() == Some(store.email.as_str())
        && recorded.auth_key.as_deref() == Some(store.api_key.as_str());
    store.requests.push(recorded);
    if authorized {
        Ok(())
    } else {
        Err(failure(
            StatusCode::FORBIDDEN,
            9103,
            "Unknown X-Auth-Key or X-Auth-Email",
        ))
    }
}

/// `match=any` keeps a record when any given filter matches; anything else
/// means all of them must.
fn matches_filter(record: &DnsRecord, query: &RecordQuery) -> bool {
    let checks: Vec<bool> = [
        query.name.as_deref().map(|n| record.name == n),
        query.record_type.as_deref().map(|t| record.record_type == t),
    ]
    .into_iter()
    .flatten()
    .collect();
    if checks.is_empty() {
        return true;
    }
    match query.match_mode.as_deref() {
        Some("any") => checks.contains(&true),
        _ => !checks.contains(&false),
    }
}

fn is_valid_domain(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 253
        && name.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

fn success<T: Serialize>(result: T) -> Response {
    Json(json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result,
    }))
    .into_response()
}

fn failure(status: StatusCode, code: i64, message: &str) -> Response {
    failure_with_chain(status, code, message, &[])
}

fn failure_with_chain(status: StatusCode, code: i64, message: &str, chain: &[(i64, &str)]) -> Response {
    let mut error = json!({ "code": code, "message": message });
    if !chain.is_empty() {
        error["error_chain"] = chain
            .iter()
            .map(|(chain_code, chain_message)| json!({ "code": chain_code, "message": chain_message }))
            .collect::<Value>();
    }
    let body = json!({
        "success": false,
        "errors": [error],
        "messages": [],
        "result": null,
    });
    (status, Json(body)).into_response()
}

fn unknown_zone(uri: &Uri) -> Response {
    let route = uri.path().trim_start_matches("/client/v4");
    failure(
        StatusCode::NOT_FOUND,
        7003,
        &format!("Could not route to {route}, perhaps your object identifier is invalid?"),
    )
}
