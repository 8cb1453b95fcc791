//! The transport session: authentication state plus single-request execution.
//!
//! # Design
//! A [`Session`] owns the only mutable client state — the bearer token — and
//! the two places that may set it are [`Session::login`] and
//! [`Session::adopt_token`]. Everything else ([`Session::execute`],
//! [`Session::send_batch`]) reads the state and performs exactly one
//! blocking exchange through the [`Transport`] seam. There is no hidden
//! global header map: headers are derived from the session fields on every
//! call.

use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;

use crate::catalog;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::ApiRequest;
use crate::transport::{Transport, UreqTransport};
use crate::types::UserInfo;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default pause before the single 404 re-attempt.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// A blocking client session for one API server.
///
/// Created unauthenticated; becomes authenticated after a successful
/// [`Session::login`] (or an explicit [`Session::adopt_token`]) and stays
/// that way for the life of the process. One exchange is in flight at a
/// time; callers wanting concurrency must serialize token writes themselves.
pub struct Session {
    api_url: String,
    client_id: Option<String>,
    token: Option<String>,
    timeout: Duration,
    retry_delay: Duration,
    transport: Box<dyn Transport>,
}

impl Session {
    /// Session against `api_url` using the production ureq transport.
    pub fn new(api_url: &str) -> Self {
        Self::with_transport(api_url, Box::new(UreqTransport))
    }

    /// Session with a caller-supplied transport.
    pub fn with_transport(api_url: &str, transport: Box<dyn Transport>) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client_id: None,
            token: None,
            timeout: DEFAULT_TIMEOUT,
            retry_delay: DEFAULT_RETRY_DELAY,
            transport,
        }
    }

    /// Attach the client identifier some server generations require. It is
    /// sent as an `X-Client-ID` header and included in the login body.
    pub fn with_client_id(mut self, client_id: &str) -> Self {
        self.client_id = Some(client_id.to_string());
        self
    }

    /// Override the default per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the pause before the single 404 re-attempt.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Log in and store the bearer token for subsequent calls.
    ///
    /// A non-success status fails with [`ApiError::Auth`] and leaves the
    /// token unset; a success body that lacks the identifier or token fields
    /// fails with [`ApiError::Decode`], likewise without storing anything.
    pub fn login(&mut self, email: &str, password: &str) -> Result<UserInfo, ApiError> {
        let request = catalog::login(email, password, self.client_id.as_deref())
            .with_server(&self.api_url);
        let wire = self.render(&request)?;
        debug!("POST {} (login)", wire.url);
        let response = self.transport.execute(&wire, self.timeout)?;
        if response.status >= 300 {
            return Err(ApiError::Auth {
                status: response.status,
            });
        }
        let user: UserInfo =
            serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.token = Some(user.token.clone());
        Ok(user)
    }

    /// Adopt an existing token, skipping the network login entirely.
    pub fn adopt_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Execute one descriptor with the session's default timeout.
    pub fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        self.execute_with_timeout(request, self.timeout)
    }

    /// Execute one descriptor with an explicit timeout.
    ///
    /// A first-response 404 is re-attempted exactly once after a short pause
    /// — the service is eventually consistent and freshly created resources
    /// can 404 briefly. The retry's status is then judged normally, and no
    /// other status is ever retried.
    pub fn execute_with_timeout(
        &self,
        request: &ApiRequest,
        timeout: Duration,
    ) -> Result<Value, ApiError> {
        let wire = self.render(request)?;
        debug!("{} {}", wire.method, wire.url);
        let response = self.transport.execute(&wire, timeout)?;
        if response.status == 404 {
            warn!("{} {} returned 404, retrying once", wire.method, wire.url);
            std::thread::sleep(self.retry_delay);
            let retried = self.transport.execute(&wire, timeout)?;
            return interpret(retried);
        }
        interpret(response)
    }

    /// Render a descriptor into a wire request with the session's headers.
    fn render(&self, request: &ApiRequest) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(request.body())
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: request.method().clone(),
            url: format!("{}{}", request.api_server(), request.path()),
            headers: self.default_headers(),
            body,
        })
    }

    fn default_headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(client_id) = &self.client_id {
            headers.push(("X-Client-ID".to_string(), client_id.clone()));
        }
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }
}

/// Apply the success boundary to a response and decode its body.
///
/// Success bodies that are not valid JSON become JSON strings of the raw
/// text rather than errors.
fn interpret(response: HttpResponse) -> Result<Value, ApiError> {
    if response.status < 300 {
        Ok(serde_json::from_str(&response.body)
            .unwrap_or_else(|_| Value::String(response.body)))
    } else {
        Err(ApiError::Http {
            status: response.status,
            body: response.body,
        })
    }
}
