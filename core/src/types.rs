//! Response envelopes and DTOs for the Cloudflare v4 API.
//!
//! # Design
//! Every DTO is a snapshot decoded from one response. Fields default when the
//! API omits them and nullable strings are `Option<String>`, so a sparse but
//! well-formed payload still decodes. Anything that is not an envelope at all
//! (missing `success`) is rejected by the parser.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ---------------------------------------------------------------------------
// Envelope and errors
// ---------------------------------------------------------------------------

/// The `{success, errors, messages, result}` wrapper around every response.
///
/// `result` stays untyped until the success check has passed, so a failure
/// envelope carrying an odd `result` still yields its error list.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<ApiErrorRecord>,
    /// Informational messages; their shape varies between endpoints.
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<serde_json::Value>,
    pub result: Option<serde_json::Value>,
}

impl Envelope {
    /// Apply the success check: the decoded payload on success, the reported
    /// errors otherwise. `result` is not decoded when `success` is false.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Request {
                errors: self.errors,
            });
        }
        let result = self.result.ok_or_else(|| {
            ApiError::Deserialization("envelope reported success without a result".to_string())
        })?;
        serde_json::from_value(result).map_err(|e| {
            log::error!("failed to decode envelope result: {}", e);
            ApiError::Deserialization(e.to_string())
        })
    }
}

/// One failure reported by the API, with its chain of underlying causes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorRecord {
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub error_chain: Vec<ErrorChainEntry>,
}

impl ApiErrorRecord {
    pub fn new(code: i64, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            error_chain: Vec::new(),
        }
    }
}

impl fmt::Display for ApiErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        for cause in &self.error_chain {
            write!(f, " (caused by {}: {})", cause.code, cause.message)?;
        }
        Ok(())
    }
}

/// A nested cause inside `ApiErrorRecord::error_chain`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorChainEntry {
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// A DNS zone as returned by `GET /zones`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub development_mode: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub original_name_servers: Vec<String>,
    pub original_registrar: Option<String>,
    pub original_dnshost: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub modified_on: Option<DateTime<Utc>>,
    pub activated_on: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub owner: ZoneOwner,
    #[serde(deserialize_with = "null_as_default")]
    pub account: ZoneAccount,
    #[serde(deserialize_with = "null_as_default")]
    pub permissions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub plan: ZonePlan,
    pub plan_pending: Option<ZonePlan>,
    pub status: String,
    pub paused: bool,
    #[serde(rename = "type")]
    pub zone_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name_servers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ZoneOwner {
    pub id: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "type", alias = "owner_type")]
    pub owner_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ZoneAccount {
    pub id: String,
    pub name: Option<String>,
}

/// Subscription plan attached to a zone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZonePlan {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub currency: Option<String>,
    pub frequency: Option<String>,
    pub legacy_id: Option<String>,
    pub is_subscribed: bool,
    pub can_subscribe: bool,
}

// ---------------------------------------------------------------------------
// DNS records
// ---------------------------------------------------------------------------

/// A DNS record snapshot as returned by the `dns_records` endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    pub proxiable: bool,
    pub proxied: bool,
    pub locked: bool,
    pub zone_id: String,
    pub zone_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub modified_on: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub meta: RecordMeta,
}

/// Provenance flags on a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordMeta {
    pub auto_added: bool,
    pub managed_by_apps: bool,
    pub managed_by_argo_tunnel: bool,
}

/// Request payload for `PUT /zones/{zone_id}/dns_records/{id}`.
///
/// The API replaces the record with exactly these fields. `ttl` of 1 means
/// "automatic".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdate {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl RecordUpdate {
    pub fn new(record_type: &str, name: &str, content: &str) -> Self {
        Self {
            record_type: record_type.to_string(),
            name: name.to_string(),
            content: content.to_string(),
            ttl: 1,
            proxied: None,
            comment: None,
        }
    }

    /// Start from an existing record so only the fields that change need to
    /// be touched.
    pub fn from_record(record: &DnsRecord) -> Self {
        Self {
            record_type: record.record_type.clone(),
            name: record.name.clone(),
            content: record.content.clone(),
            ttl: record.ttl,
            proxied: Some(record.proxied),
            comment: record.comment.clone(),
        }
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = Some(proxied);
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    /// Encode as the JSON body `update_record` expects.
    pub fn to_json(&self) -> Result<Vec<u8>, ApiError> {
        serde_json::to_vec(self).map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Profile of the authenticated user (`GET /user`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub telephone: Option<String>,
    pub country: Option<String>,
    pub zipcode: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub modified_on: Option<DateTime<Utc>>,
    pub two_factor_authentication_enabled: bool,
    pub suspended: bool,
}
