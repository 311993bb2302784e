//! Request execution.
//!
//! `Transport` is the only place a request leaves the process. The default
//! implementation is a blocking ureq agent; tests swap in fakes that record
//! what would have been sent.

use std::time::Duration;

use ureq::{Agent, RequestBuilder};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one `HttpRequest` and returns the full response.
///
/// Implementations must not interpret the status code or the body, and must
/// not retry.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a shared ureq agent.
///
/// 4xx/5xx responses come back as data rather than `Err` so the envelope can
/// be decoded. The agent-wide timeout bounds each call from connect to the
/// last body byte unless the request carries its own.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        log::debug!("{} {}", request.method, request.url);

        let sent = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => prepare(self.agent.get(request.url.as_str()), request).call(),
            (HttpMethod::Put, Some(body)) => prepare(self.agent.put(request.url.as_str()), request).send(body),
            (HttpMethod::Put, None) => prepare(self.agent.put(request.url.as_str()), request).send_empty(),
        };
        let mut response = sent.map_err(|e| {
            log::debug!("{} {} failed: {}", request.method, request.url, e);
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        log::debug!("response status: {}", status);

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ApiError::Transport(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse { status, headers, body })
    }
}

fn prepare<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    match request.timeout {
        Some(timeout) => builder.config().timeout_global(Some(timeout)).build(),
        None => builder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Nothing listens on the loopback discard port.
        let transport = UreqTransport::new(Duration::from_secs(2));
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:9/client/v4/user".to_string(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        };
        let err = transport.execute(&request).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn malformed_url_is_a_transport_error() {
        let transport = UreqTransport::new(Duration::from_secs(2));
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "not a url".to_string(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        };
        let err = transport.execute(&request).unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn request_timeout_overrides_agent_timeout() {
        // Accepts connections into the backlog but never answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let transport = UreqTransport::new(Duration::from_secs(30));
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: format!("http://{addr}/client/v4/user"),
            headers: Vec::new(),
            body: None,
            timeout: Some(Duration::from_millis(200)),
        };
        let started = std::time::Instant::now();
        let err = transport.execute(&request).unwrap_err();
        assert!(err.is_transport());
        assert!(started.elapsed() < Duration::from_secs(10));
        drop(listener);
    }
}
