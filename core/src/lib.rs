//! Blocking client for the task-management API, with request batching.
//!
//! # Overview
//! A [`Session`] holds the authentication state and performs one blocking
//! HTTP exchange at a time. Operations are described by immutable
//! [`ApiRequest`] values — built by hand or by the [`catalog`] constructors
//! — and executed either one at a time ([`Session::execute`]) or folded
//! into a single round trip ([`Session::send_batch`]), which returns an
//! ordered, single-use [`BatchResults`] iterator that stops permanently at
//! the first failing sub-result.
//!
//! # Design
//! - Descriptors are plain data; constructing one never touches the network.
//! - The network sits behind the [`Transport`] trait, so session behavior
//!   (headers, the scoped 404 retry, timeout mapping) is testable with a
//!   scripted transport.
//! - The bearer token is written only by [`Session::login`] and
//!   [`Session::adopt_token`]; every request derives its headers from the
//!   session fields at call time.

pub mod batch;
pub mod catalog;
pub mod error;
pub mod http;
pub mod request;
pub mod session;
pub mod transport;
pub mod types;

pub use batch::BatchResults;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::{ApiRequest, API_URL, BATCH_PATH, COMMENTS_URL};
pub use session::{Session, DEFAULT_TIMEOUT};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::UserInfo;
