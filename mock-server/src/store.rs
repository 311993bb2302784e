//! In-memory data behind the mock API.
//!
//! The seed mirrors the shapes of real Cloudflare payloads closely enough for
//! the client's DTOs to exercise nullable and nested fields.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const EMAIL: &str = "user@example.com";
pub const API_KEY: &str = "c2547eb745079dac9320b638f5e225cf483cc5cfdda41";

pub const ZONE_ID: &str = "023e105f4ecef8ad9ca31a8372d0c353";
pub const ZONE_NAME: &str = "example.com";
pub const WWW_RECORD_ID: &str = "372e67954025e0ba6aaa6d586b9e0b59";
pub const APEX_RECORD_ID: &str = "9a7806061c88ada191ed06f989cc3dac";
pub const TXT_RECORD_ID: &str = "0f1e2d3c4b5a69788796a5b4c3d2e1f0";

const SEED_TIME: &str = "2014-01-01T05:20:00.12345Z";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub status: String,
    pub paused: bool,
    #[serde(rename = "type")]
    pub zone_type: String,
    pub development_mode: i64,
    pub name_servers: Vec<String>,
    pub original_name_servers: Option<Vec<String>>,
    pub original_registrar: Option<String>,
    pub original_dnshost: Option<String>,
    pub owner: Value,
    pub account: Value,
    pub permissions: Vec<String>,
    pub plan: Value,
    pub created_on: String,
    pub modified_on: String,
    pub activated_on: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub proxiable: bool,
    pub proxied: bool,
    pub locked: bool,
    pub zone_id: String,
    pub zone_name: String,
    pub comment: Option<String>,
    pub tags: Vec<String>,
    pub created_on: String,
    pub modified_on: String,
    pub meta: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: String,
    pub telephone: Option<String>,
    pub country: Option<String>,
    pub zipcode: Option<String>,
    pub created_on: String,
    pub modified_on: String,
    pub two_factor_authentication_enabled: bool,
    pub suspended: bool,
}

/// Body accepted by the record update endpoint.
#[derive(Debug, Deserialize)]
pub struct RecordUpdate {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    #[serde(default = "automatic_ttl")]
    pub ttl: u32,
    pub proxied: Option<bool>,
    pub comment: Option<String>,
}

fn automatic_ttl() -> u32 {
    1
}

/// One request as the mock received it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path_and_query: String,
    pub auth_email: Option<String>,
    pub auth_key: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug)]
pub struct Store {
    pub email: String,
    pub api_key: String,
    pub zones: Vec<Zone>,
    pub records: Vec<DnsRecord>,
    pub user: User,
    pub requests: Vec<RecordedRequest>,
}

impl Store {
    /// One zone (`example.com`) with an apex A record, a proxied `www` A
    /// record and a TXT record.
    pub fn seeded() -> Self {
        let zone = Zone {
            id: ZONE_ID.to_string(),
            name: ZONE_NAME.to_string(),
            status: "active".to_string(),
            paused: false,
            zone_type: "full".to_string(),
            development_mode: 0,
            name_servers: vec!["bob.ns.cloudflare.com".to_string(), "lola.ns.cloudflare.com".to_string()],
            original_name_servers: Some(vec!["ns1.originaldnshost.com".to_string()]),
            original_registrar: None,
            original_dnshost: None,
            owner: json!({"id": null, "type": "user", "email": null}),
            account: json!({"id": "01a7362d577a6c3019a474fd6f485823", "name": "Demo Account"}),
            permissions: vec!["#dns_records:edit".to_string(), "#dns_records:read".to_string()],
            plan: json!({
                "id": "0feeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
                "name": "Free Website",
                "price": 0,
                "currency": "USD",
                "frequency": "",
                "legacy_id": "free",
                "is_subscribed": false,
                "can_subscribe": false
            }),
            created_on: SEED_TIME.to_string(),
            modified_on: SEED_TIME.to_string(),
            activated_on: SEED_TIME.to_string(),
        };

        let records = vec![
            record(APEX_RECORD_ID, "A", ZONE_NAME, "198.51.100.4", 1, false),
            record(WWW_RECORD_ID, "A", "www.example.com", "198.51.100.5", 3600, true),
            record(TXT_RECORD_ID, "TXT", ZONE_NAME, "v=spf1 -all", 300, false),
        ];

        let user = User {
            id: "7c5dae5552338874e5053f2534d2767a".to_string(),
            email: EMAIL.to_string(),
            first_name: Some("John".to_string()),
            last_name: Some("Appleseed".to_string()),
            username: "cfuser12345".to_string(),
            telephone: None,
            country: Some("US".to_string()),
            zipcode: None,
            created_on: SEED_TIME.to_string(),
            modified_on: SEED_TIME.to_string(),
            two_factor_authentication_enabled: false,
            suspended: false,
        };

        Self {
            email: EMAIL.to_string(),
            api_key: API_KEY.to_string(),
            zones: vec![zone],
            records,
            user,
            requests: Vec::new(),
        }
    }

    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }
}

fn record(id: &str, record_type: &str, name: &str, content: &str, ttl: u32, proxied: bool) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        record_type: record_type.to_string(),
        name: name.to_string(),
        content: content.to_string(),
        ttl,
        proxiable: record_type != "TXT",
        proxied,
        locked: false,
        zone_id: ZONE_ID.to_string(),
        zone_name: ZONE_NAME.to_string(),
        comment: None,
        tags: Vec::new(),
        created_on: SEED_TIME.to_string(),
        modified_on: SEED_TIME.to_string(),
        meta: json!({"auto_added": false, "managed_by_apps": false, "managed_by_argo_tunnel": false}),
    }
}
