//! The Cloudflare DNS client.
//!
//! # Design
//! `CloudflareClient` pairs a stateless `CloudflareApi` with a `Transport`.
//! Every operation is one or two round trips: record operations resolve the
//! zone id first and stop there if that fails.
//!
//! Failures come back as `ApiError` values carrying the API's error list. The
//! most recent list is also kept behind a mutex for `get_error`, so the client
//! stays shareable across threads; with concurrent callers it reflects
//! whichever failing call finished last.
//!
//! `with_deadline` runs the same operations under a caller-chosen bound. The
//! deadline covers the whole operation, zone lookup included, and each round
//! trip gets whatever time is left of it.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::api::CloudflareApi;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{ApiErrorRecord, DnsRecord, RecordUpdate, User, Zone};

/// Blocking client for zone lookup, record listing/update and the user
/// profile.
pub struct CloudflareClient<T: Transport = UreqTransport> {
    api: CloudflareApi,
    transport: T,
    last_errors: Mutex<Vec<ApiErrorRecord>>,
}

impl CloudflareClient<UreqTransport> {
    /// Client using a ureq agent with the configured timeout.
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }

    /// Shorthand for `ClientConfig::from_env` followed by `new`.
    pub fn from_env() -> Result<Self, ApiError> {
        ClientConfig::from_env().map(Self::new)
    }
}

impl<T: Transport> CloudflareClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            api: CloudflareApi::new(config),
            transport,
            last_errors: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.api.config()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Operations bounded by `timeout` instead of the configured per-request
    /// timeout.
    pub fn with_deadline(&self, timeout: Duration) -> Deadline<'_, T> {
        Deadline {
            client: self,
            timeout,
        }
    }

    /// All zones matching the configured domain. The list may be empty or
    /// hold several entries; use `zone_id` when exactly one is required.
    pub fn get_zone(&self) -> Result<Vec<Zone>, ApiError> {
        self.fetch_zones(None)
    }

    /// The id of the single zone matching the configured domain.
    pub fn zone_id(&self) -> Result<String, ApiError> {
        self.resolve_zone(None)
    }

    /// Records in the configured zone matching both `name` and
    /// `record_type`. No match is an empty list, not an error.
    pub fn get_record(&self, name: &str, record_type: &str) -> Result<Vec<DnsRecord>, ApiError> {
        self.fetch_records(name, record_type, None)
    }

    /// Replace record `id` with the pre-encoded JSON in `data`, which is sent
    /// unmodified. Returns the record as the API reports it after the update.
    pub fn update_record(&self, id: &str, data: &[u8]) -> Result<DnsRecord, ApiError> {
        self.put_record(id, data, None)
    }

    /// Encode `update` and send it through `update_record`.
    pub fn update_record_with(&self, id: &str, update: &RecordUpdate) -> Result<DnsRecord, ApiError> {
        let body = update.to_json()?;
        self.update_record(id, &body)
    }

    /// Profile of the user the credentials belong to.
    pub fn get_user(&self) -> Result<User, ApiError> {
        self.fetch_user(None)
    }

    /// The most recently recorded API error list, rendered as
    /// `Error: <json>`. Renders `Error: []` before any failure.
    pub fn get_error(&self) -> String {
        let errors = self.last_errors();
        let rendered = serde_json::to_string(&errors).unwrap_or_else(|_| "[]".to_string());
        format!("Error: {rendered}")
    }

    /// The API error list recorded by the most recent failing call.
    pub fn last_errors(&self) -> Vec<ApiErrorRecord> {
        self.last_errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn fetch_zones(&self, until: Option<Instant>) -> Result<Vec<Zone>, ApiError> {
        let request = self.api.build_get_zone();
        self.call(request, until, |api, response| api.parse_zones(response))
    }

    fn resolve_zone(&self, until: Option<Instant>) -> Result<String, ApiError> {
        let domain = &self.config().domain;
        let mut zones = self.fetch_zones(until)?;
        match zones.len() {
            1 => Ok(zones.remove(0).id),
            0 => Err(ApiError::ZoneNotFound {
                domain: domain.clone(),
            }),
            count => Err(ApiError::AmbiguousZone {
                domain: domain.clone(),
                count,
            }),
        }
    }

    fn fetch_records(
        &self,
        name: &str,
        record_type: &str,
        until: Option<Instant>,
    ) -> Result<Vec<DnsRecord>, ApiError> {
        let zone_id = self.resolve_zone(until)?;
        let request = self.api.build_get_records(&zone_id, name, record_type);
        self.call(request, until, |api, response| api.parse_records(response))
    }

    fn put_record(&self, id: &str, data: &[u8], until: Option<Instant>) -> Result<DnsRecord, ApiError> {
        let zone_id = self.resolve_zone(until)?;
        let request = self.api.build_update_record(&zone_id, id, data);
        self.call(request, until, |api, response| api.parse_record(response))
    }

    fn fetch_user(&self, until: Option<Instant>) -> Result<User, ApiError> {
        let request = self.api.build_get_user();
        self.call(request, until, |api, response| api.parse_user(response))
    }

    fn call<R>(
        &self,
        mut request: HttpRequest,
        until: Option<Instant>,
        parse: impl FnOnce(&CloudflareApi, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        if let Some(until) = until {
            let remaining = until.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ApiError::Transport(format!(
                    "deadline elapsed before {} {}",
                    request.method, request.url
                )));
            }
            request.timeout = Some(remaining);
        }
        let response = self.transport.execute(&request)?;
        parse(&self.api, response).inspect_err(|err| {
            if let ApiError::Request { errors } = err {
                log::warn!("{} {} rejected: {}", request.method, request.url, err);
                self.record_errors(errors);
            }
        })
    }

    fn record_errors(&self, errors: &[ApiErrorRecord]) {
        let mut slot = self.last_errors.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = errors.to_vec();
    }
}

/// The client's operations under one caller-chosen deadline, started afresh
/// by each operation. Errors are recorded on the underlying client.
pub struct Deadline<'a, T: Transport> {
    client: &'a CloudflareClient<T>,
    timeout: Duration,
}

impl<T: Transport> Deadline<'_, T> {
    pub fn get_zone(&self) -> Result<Vec<Zone>, ApiError> {
        self.client.fetch_zones(Some(self.until()))
    }

    pub fn zone_id(&self) -> Result<String, ApiError> {
        self.client.resolve_zone(Some(self.until()))
    }

    pub fn get_record(&self, name: &str, record_type: &str) -> Result<Vec<DnsRecord>, ApiError> {
        self.client.fetch_records(name, record_type, Some(self.until()))
    }

    pub fn update_record(&self, id: &str, data: &[u8]) -> Result<DnsRecord, ApiError> {
        self.client.put_record(id, data, Some(self.until()))
    }

    pub fn update_record_with(&self, id: &str, update: &RecordUpdate) -> Result<DnsRecord, ApiError> {
        let body = update.to_json()?;
        self.update_record(id, &body)
    }

    pub fn get_user(&self) -> Result<User, ApiError> {
        self.client.fetch_user(Some(self.until()))
    }

    fn until(&self) -> Instant {
        Instant::now() + self.timeout
    }
}
