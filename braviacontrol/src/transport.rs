use std::time::Duration;

use tracing::debug;
use ureq::Agent;

use crate::errors::BraviaError;

/// Outgoing POST, already fully encoded.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// `None` blocks until the device answers.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Result of a POST:
/// - HTTP status code
/// - raw body (always, even for 4xx/5xx)
#[derive(Clone, Debug)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Everything the client needs from HTTP.
pub trait Transport: Send + Sync {
    fn post(&self, request: &HttpRequest) -> Result<HttpReply, BraviaError>;
}

/// Blocking transport backed by `ureq`.
///
/// One agent is shared by every request so connections to the set are
/// reused. The per-request timeout is applied on top of it.
#[derive(Clone, Debug)]
pub struct UreqTransport {
    agent: Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        // Status codes are not errors here: SOAP faults and JSON-RPC
        // errors still carry a body worth reading.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn post(&self, request: &HttpRequest) -> Result<HttpReply, BraviaError> {
        debug!(url = %request.url, timeout = ?request.timeout, "POST");

        let mut builder = self
            .agent
            .post(&request.url)
            .config()
            .timeout_global(request.timeout)
            .build();
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder
            .send(request.body.as_str())
            .map_err(|e| BraviaError::transport(&request.url, e))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| BraviaError::transport(&request.url, e))?;

        debug!(url = %request.url, status, "Response received");
        Ok(HttpReply { status, body })
    }
}
