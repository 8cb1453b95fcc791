//! The blocking HTTP executor behind the session.
//!
//! # Design
//! [`Transport`] is the only seam that touches the network: one rendered
//! [`HttpRequest`] in, one [`HttpResponse`] out, bounded by a per-call
//! timeout. The production implementation rides on ureq; tests swap in a
//! scripted transport that replays canned responses, so session behavior
//! (headers, 404 retry, timeout mapping) is verified without sockets.

use std::fmt;
use std::time::Duration;

use crate::http::{HttpRequest, HttpResponse};

/// Failures below the HTTP layer.
///
/// Non-success *statuses* are not transport errors — they come back as
/// ordinary [`HttpResponse`] values for the session to interpret.
#[derive(Debug)]
pub enum TransportError {
    /// No response arrived within the configured timeout.
    Timeout,

    /// Anything else that kept the exchange from completing.
    Io(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout => write!(f, "timed out waiting for a response"),
            TransportError::Io(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// A blocking, single-exchange HTTP executor.
pub trait Transport {
    /// Execute one request, blocking until a response arrives or `timeout`
    /// elapses.
    fn execute(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TransportError>;
}

/// Production transport built on ureq.
///
/// Status-as-error is disabled so 4xx/5xx responses come back as data, and
/// requests go through `Agent::run` so any verb can carry a JSON body — the
/// API expects parameters in the body even on GET and DELETE.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport;

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TransportError> {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();

        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let wire = builder
            .body(request.body.clone())
            .map_err(|e| TransportError::Io(e.to_string()))?;

        let mut response = agent.run(wire).map_err(|e| match e {
            ureq::Error::Timeout(..) => TransportError::Timeout,
            other => TransportError::Io(other.to_string()),
        })?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();
        Ok(HttpResponse { status, body })
    }
}
