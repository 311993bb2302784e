//! Error types for the Cloudflare DNS client.
//!
//! # Design
//! Two tiers of failure reach the caller. Transport failures (`Transport`,
//! `HttpStatus`) mean no usable envelope came back. API failures (`Request`)
//! mean the round trip worked but the envelope reported `success: false`;
//! the structured error list travels inside the variant so callers never
//! have to go back to the client to find out what went wrong.

use thiserror::Error;

use crate::types::ApiErrorRecord;

/// Errors returned by `CloudflareApi` parse methods and `CloudflareClient`
/// operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be built or sent, or the response could not be
    /// read (malformed URL, DNS, connection refused, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status and a body that is not an
    /// API envelope.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A 2xx response body could not be decoded into the expected envelope.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// An update payload could not be encoded to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The API envelope reported `success: false`.
    #[error("request error: {}", summarize(.errors))]
    Request { errors: Vec<ApiErrorRecord> },

    /// The zone lookup for the configured domain matched nothing.
    #[error("no zone found for domain {domain}")]
    ZoneNotFound { domain: String },

    /// The zone lookup matched more than one zone, so there is no single id
    /// to operate on.
    #[error("zone lookup for {domain} is ambiguous: {count} zones matched")]
    AmbiguousZone { domain: String, count: usize },

    /// Client configuration is missing or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// The API-reported error records, empty for every variant but `Request`.
    pub fn api_errors(&self) -> &[ApiErrorRecord] {
        match self {
            ApiError::Request { errors } => errors,
            _ => &[],
        }
    }

    /// True for failures below the API envelope (no response to interpret).
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::HttpStatus { .. })
    }
}

fn summarize(errors: &[ApiErrorRecord]) -> String {
    if errors.is_empty() {
        return "no error details reported".to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
