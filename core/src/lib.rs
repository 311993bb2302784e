//! Blocking client for the Cloudflare DNS management API.
//!
//! # Overview
//! Looks up a zone by domain name, lists DNS records by name and type,
//! replaces a single record and fetches the authenticated user's profile,
//! authenticating with the `X-Auth-Email` / `X-Auth-Key` header pair.
//!
//! # Design
//! - `CloudflareApi` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network.
//! - `Transport` executes requests; `UreqTransport` is the blocking default
//!   with an explicit timeout.
//! - `CloudflareClient` runs each operation through the two, returning the
//!   API's structured error list inside `ApiError::Request` and remembering
//!   the latest list for `get_error`.
//! - Every response is an `Envelope`; its `success` flag decides the outcome.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use api::CloudflareApi;
pub use client::{CloudflareClient, Deadline};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{
    ApiErrorRecord, DnsRecord, Envelope, ErrorChainEntry, RecordMeta, RecordUpdate, User, Zone,
    ZoneAccount, ZoneOwner, ZonePlan,
};
