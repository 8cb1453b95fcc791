//! The request descriptor: one API operation as an immutable value.
//!
//! # Design
//! An [`ApiRequest`] names everything needed to perform one operation —
//! method, server-relative path, JSON body, target origin — and nothing
//! about how to perform it. Constructing one never does I/O, so descriptors
//! can be built eagerly, collected, reordered, and handed to either
//! [`crate::session::Session::execute`] one at a time or
//! [`crate::session::Session::send_batch`] all at once.

use serde_json::{json, Map, Value};

use crate::http::HttpMethod;

/// Primary API origin.
pub const API_URL: &str = "https://a.tasklist.com/api/v1";

/// Origin of the comments sub-service. Descriptors targeting it cannot be
/// batched through the primary origin and must be executed individually.
pub const COMMENTS_URL: &str = "https://comments.tasklist.com";

/// Server-relative path of the batch endpoint.
pub const BATCH_PATH: &str = "/batch";

/// An immutable description of one API operation.
///
/// The body is always a JSON object: an absent body normalizes to an empty
/// map at construction, so its batch `params` serialize as `{}` rather than
/// `null`. The target server defaults to [`API_URL`]; use
/// [`ApiRequest::with_server`] to point a descriptor elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: HttpMethod,
    path: String,
    body: Map<String, Value>,
    api_server: String,
}

impl ApiRequest {
    /// Build a descriptor for `method path`. `path` must be server-relative
    /// (leading `/`) and non-empty.
    pub fn new(method: HttpMethod, path: impl Into<String>, body: Option<Map<String, Value>>) -> Self {
        let path = path.into();
        debug_assert!(path.starts_with('/'), "path must be server-relative: {path:?}");
        Self {
            method,
            path,
            body: body.unwrap_or_default(),
            api_server: API_URL.to_string(),
        }
    }

    /// Retarget the descriptor at a different server origin. Trailing
    /// slashes are trimmed so origin comparisons stay exact.
    pub fn with_server(mut self, server: &str) -> Self {
        self.api_server = server.trim_end_matches('/').to_string();
        self
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn api_server(&self) -> &str {
        &self.api_server
    }

    /// Render this descriptor as one `{method, url, params}` batch op.
    pub fn batch_op(&self) -> Value {
        json!({
            "method": self.method.as_str(),
            "url": self.path,
            "params": self.body,
        })
    }
}
