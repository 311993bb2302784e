//! Stateless request builder and response parser for the Cloudflare DNS API.
//!
//! # Design
//! `CloudflareApi` holds only configuration and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. `CloudflareClient` glues the two together through a
//! `Transport`; keeping this layer free of I/O means every URL, header and
//! body the client produces can be checked against fixed test vectors.

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{DnsRecord, Envelope, User, Zone};

pub const HEADER_AUTH_EMAIL: &str = "X-Auth-Email";
pub const HEADER_AUTH_KEY: &str = "X-Auth-Key";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Request builder and response parser for the four supported operations.
#[derive(Debug, Clone)]
pub struct CloudflareApi {
    config: ClientConfig,
}

impl CloudflareApi {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET /zones?name=<domain>` for the configured domain.
    pub fn build_get_zone(&self) -> HttpRequest {
        let url = format!(
            "{}/zones?name={}",
            self.config.base_url,
            urlencoding::encode(&self.config.domain)
        );
        self.request(HttpMethod::Get, url, None)
    }

    /// `GET /zones/<zone_id>/dns_records?match=all&name=<name>&type=<type>`.
    pub fn build_get_records(&self, zone_id: &str, name: &str, record_type: &str) -> HttpRequest {
        let url = format!(
            "{}/zones/{}/dns_records?match=all&name={}&type={}",
            self.config.base_url,
            urlencoding::encode(zone_id),
            urlencoding::encode(name),
            urlencoding::encode(record_type),
        );
        self.request(HttpMethod::Get, url, None)
    }

    /// `PUT /zones/<zone_id>/dns_records/<record_id>` carrying `body`
    /// unmodified. An empty body is not sent at all.
    pub fn build_update_record(&self, zone_id: &str, record_id: &str, body: &[u8]) -> HttpRequest {
        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.config.base_url,
            urlencoding::encode(zone_id),
            urlencoding::encode(record_id),
        );
        let body = (!body.is_empty()).then(|| body.to_vec());
        self.request(HttpMethod::Put, url, body)
    }

    /// `GET /user`.
    pub fn build_get_user(&self) -> HttpRequest {
        let url = format!("{}/user", self.config.base_url);
        self.request(HttpMethod::Get, url, None)
    }

    pub fn parse_zones(&self, response: HttpResponse) -> Result<Vec<Zone>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_records(&self, response: HttpResponse) -> Result<Vec<DnsRecord>, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_record(&self, response: HttpResponse) -> Result<DnsRecord, ApiError> {
        parse_envelope(response)
    }

    pub fn parse_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_envelope(response)
    }

    /// Every request carries exactly the two auth headers and the JSON
    /// content type, whatever the method.
    fn request(&self, method: HttpMethod, url: String, body: Option<Vec<u8>>) -> HttpRequest {
        HttpRequest {
            method,
            url,
            headers: vec![
                (HEADER_AUTH_EMAIL.to_string(), self.config.email.clone()),
                (HEADER_AUTH_KEY.to_string(), self.config.token.clone()),
                (HEADER_CONTENT_TYPE.to_string(), CONTENT_TYPE_JSON.to_string()),
            ],
            body,
            timeout: None,
        }
    }
}

/// Longest body excerpt written to the log when a response fails to decode.
const LOGGED_BODY_LIMIT: usize = 512;

/// Decode an envelope and apply its `success` flag.
///
/// The flag is authoritative whatever the HTTP status. Only when the body is
/// not an envelope does the status matter: non-2xx becomes `HttpStatus`,
/// 2xx becomes `Deserialization`.
fn parse_envelope<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    let envelope: Envelope = match serde_json::from_slice(&response.body) {
        Ok(envelope) => envelope,
        Err(e) if !response.is_success() => {
            log::debug!("non-envelope body with status {}: {}", response.status, e);
            return Err(ApiError::HttpStatus {
                status: response.status,
                body: response.body_text(),
            });
        }
        Err(e) => {
            log::error!("failed to decode response envelope: {}", e);
            log::debug!("raw response: {}", excerpt(&response.body_text(), LOGGED_BODY_LIMIT));
            return Err(ApiError::Deserialization(e.to_string()));
        }
    };
    envelope.into_result()
}

/// At most `limit` bytes of `text`, cut on a char boundary.
fn excerpt(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
