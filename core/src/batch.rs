//! Batch coordination: many descriptors, one round trip, ordered results.
//!
//! # Design
//! [`Session::send_batch`] folds N descriptors into a single POST to the
//! batch endpoint with `sequential: true`, so the server applies the
//! operations in order and stops at the first failure. The response — one
//! `results` array of `{status, body}` elements — is unpacked into a
//! [`BatchResults`] iterator that mirrors what N separate calls would have
//! produced: each pull yields the next success payload, the first failing
//! element yields [`ApiError::BatchItem`] and permanently ends iteration.
//!
//! The whole response is in memory before the iterator exists; laziness here
//! governs when a failure is *surfaced*, not when the network runs. The
//! iterator is single-use and fused.

use std::iter::FusedIterator;

use log::debug;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::request::{ApiRequest, BATCH_PATH};
use crate::session::Session;

impl Session {
    /// Send `requests` as one sequential batch and return the ordered,
    /// single-use result sequence.
    ///
    /// Every descriptor must target the session's origin — the batch
    /// endpoint cannot forward to other servers — otherwise this fails with
    /// [`ApiError::Configuration`] before any network traffic. Descriptors
    /// for foreign origins (the comments sub-service, say) must go through
    /// [`Session::execute`] individually.
    pub fn send_batch(&self, requests: &[ApiRequest]) -> Result<BatchResults, ApiError> {
        for request in requests {
            if request.api_server() != self.api_url() {
                return Err(ApiError::Configuration(format!(
                    "cannot batch a request for {} through {}",
                    request.api_server(),
                    self.api_url()
                )));
            }
        }

        let ops: Vec<Value> = requests.iter().map(ApiRequest::batch_op).collect();
        debug!("sending batch of {} ops", ops.len());

        let mut envelope = Map::new();
        envelope.insert("ops".to_string(), Value::Array(ops));
        envelope.insert("sequential".to_string(), Value::Bool(true));
        let batch_request =
            ApiRequest::new(HttpMethod::Post, BATCH_PATH, Some(envelope)).with_server(self.api_url());

        let document = self.execute(&batch_request)?;
        BatchResults::from_document(document)
    }
}

/// Ordered, single-use view of a batch's per-operation outcomes.
///
/// Yields `Ok(body)` for each element whose status is below 300. The first
/// failing element yields `Err(ApiError::BatchItem)` exactly once, after
/// which the iterator is exhausted — later elements are never exposed, even
/// when the raw response contains them. An all-success batch yields exactly
/// as many elements as were submitted.
#[derive(Debug)]
pub struct BatchResults {
    entries: std::vec::IntoIter<(u16, Value)>,
    index: usize,
    halted: bool,
}

impl BatchResults {
    /// Unpack the server's batch document. The document must hold a
    /// `results` array whose elements each carry a numeric `status`.
    fn from_document(document: Value) -> Result<Self, ApiError> {
        let results = document
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::Decode("batch response has no results array".to_string()))?;

        let entries = results
            .iter()
            .map(|entry| {
                let status = entry
                    .get("status")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| {
                        ApiError::Decode("batch result element has no status".to_string())
                    })?;
                let body = entry.get("body").cloned().unwrap_or(Value::Null);
                Ok((status as u16, body))
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        Ok(Self {
            entries: entries.into_iter(),
            index: 0,
            halted: false,
        })
    }
}

impl Iterator for BatchResults {
    type Item = Result<Value, ApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        let (status, body) = self.entries.next()?;
        let index = self.index;
        self.index += 1;
        if status < 300 {
            Some(Ok(body))
        } else {
            self.halted = true;
            Some(Err(ApiError::BatchItem { index, status }))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.halted {
            (0, Some(0))
        } else {
            // A failure may cut the sequence short, so only the upper bound
            // is exact.
            (0, Some(self.entries.len()))
        }
    }
}

impl FusedIterator for BatchResults {}
