//! Client configuration.
//!
//! Credentials and the target domain are supplied programmatically or read
//! from the environment. The API base URL and the request timeout default to
//! the public Cloudflare endpoint and 30 seconds.

use std::fmt;
use std::time::Duration;

use crate::error::ApiError;

/// Public Cloudflare v4 API root.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Upper bound on a single request, connect to last body byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_EMAIL: &str = "CLOUDFLARE_EMAIL";
pub const ENV_API_KEY: &str = "CLOUDFLARE_API_KEY";
pub const ENV_DOMAIN: &str = "CLOUDFLARE_DOMAIN";
pub const ENV_BASE_URL: &str = "CLOUDFLARE_API_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "CLOUDFLARE_TIMEOUT_SECS";

/// Everything a `CloudflareClient` needs to talk to the API.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Sent verbatim as `X-Auth-Email`.
    pub email: String,
    /// Sent verbatim as `X-Auth-Key`.
    pub token: String,
    /// DNS name of the zone every record operation targets.
    pub domain: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(email: &str, token: &str, domain: &str) -> Self {
        Self {
            email: email.to_string(),
            token: token.to_string(),
            domain: domain.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point the client at another API root, e.g. a mock server.
    /// A trailing slash is stripped.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read the configuration from `CLOUDFLARE_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key/value source.
    ///
    /// Email, API key and domain are required and must be non-blank. The
    /// base URL and the timeout (whole seconds, greater than zero) are
    /// optional.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, ApiError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ApiError::Config(format!("{key} is not set")))
        };

        let mut config = Self::new(
            &required(ENV_EMAIL)?,
            &required(ENV_API_KEY)?,
            &required(ENV_DOMAIN)?,
        );

        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(base_url.trim());
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ApiError::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number, got {raw:?}"))
            })?;
            if secs == 0 {
                return Err(ApiError::Config(format!(
                    "{ENV_TIMEOUT_SECS} must be greater than zero"
                )));
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

// The API key never shows up in logs or panic messages.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("email", &self.email)
            .field("token", &"<redacted>")
            .field("domain", &self.domain)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
