//! Per-endpoint dispatch outcomes.

use crate::upstream::errors::UpstreamError;
use std::{sync::Arc, time::Duration};

/// Result of one endpoint invocation within one dispatch.
#[derive(Debug)]
pub struct Outcome<T> {
    /// Name of the endpoint that produced this outcome.
    pub endpoint: Arc<str>,
    /// Decoded value or the endpoint's error.
    pub result: Result<T, UpstreamError>,
    /// Time from the start of the call until the outcome was ready.
    pub elapsed: Duration,
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn new(endpoint: impl Into<Arc<str>>, result: Result<T, UpstreamError>) -> Self {
        Self { endpoint: endpoint.into(), result, elapsed: Duration::ZERO }
    }

    /// Returns the value if the call succeeded.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    /// Returns the error if the call failed.
    #[must_use]
    pub fn error(&self) -> Option<&UpstreamError> {
        self.result.as_ref().err()
    }
}
