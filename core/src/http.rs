//! Wire-level HTTP types shared by the session and the transport seam.
//!
//! # Design
//! Requests and responses cross the transport boundary as plain data. The
//! session renders an [`crate::request::ApiRequest`] into an `HttpRequest`
//! (absolute URL, serialized JSON body, merged headers) and interprets the
//! `HttpResponse` that comes back; the transport does nothing but move bytes.
//! Keeping this seam data-only makes retry and header logic testable with a
//! scripted transport instead of a live server.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// The method's canonical upper-case wire form, as used in batch ops.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully rendered HTTP request, ready for a transport to execute.
///
/// `url` is absolute (server origin plus resource path) and `body` is the
/// already-serialized JSON text. An empty body map renders as `{}`, so the
/// body is never absent on the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// The raw outcome of one HTTP exchange.
///
/// Status interpretation (success boundary, 404 retry, JSON decoding) is the
/// session's job, so the transport reports every status as data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}
