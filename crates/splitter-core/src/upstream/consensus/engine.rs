//! Fan-out / fan-in dispatcher.
//!
//! One dispatch sends the same call to every configured endpoint concurrently and feeds the
//! outcomes to a [`Resolver`] as they arrive:
//!
//! ```text
//!            ┌─► endpoint 1 ─┐
//! dispatch ──┼─► endpoint 2 ─┼──► mpsc ──► collect ──► resolver
//!            └─► endpoint N ─┘
//! ```
//!
//! Each endpoint task runs `timeout_at(deadline, call)` and decodes the answer. The collector
//! resolves the first time the graceful deadline fires, on every arrival after that, and when
//! every endpoint has reported.
//!
//! ```text
//! graceful deadline ─┬─ resolved ──► Ok(value)
//!                    └─ unresolved ─► wait for next arrival ─┬─ resolved ──► Ok(value)
//!                                                            └─ all reported ──► Err(errors)
//! ```
//!
//! A successful resolution returns immediately; the remaining endpoint tasks are aborted when the
//! `JoinSet` is dropped. A failed resolution is only surfaced once every endpoint has reported,
//! which the total deadline guarantees happens in bounded time.

use super::{config::ConsensusConfig, errors::ConsensusError, quorum::Resolver, types::Outcome};
use crate::upstream::{endpoint::Endpoint, errors::UpstreamError};
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};
use tokio::{
    sync::mpsc,
    task::JoinSet,
    time::{sleep_until, timeout_at, Instant},
};
use tracing::{debug, warn};

/// Sends every call to all endpoints and resolves the collected outcomes.
///
/// The endpoint list is fixed at construction and read-only afterwards, so one dispatcher can be
/// shared across any number of concurrent inbound calls.
pub struct Dispatcher {
    endpoints: Vec<Arc<dyn Endpoint>>,
    config: ConsensusConfig,
}

impl Dispatcher {
    /// Creates a dispatcher over `endpoints`.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoints` is empty or `config` cannot be satisfied by it (see
    /// [`ConsensusConfig::validate`]).
    pub fn new(
        endpoints: Vec<Arc<dyn Endpoint>>,
        config: ConsensusConfig,
    ) -> Result<Self, ConsensusError> {
        config.validate(endpoints.len())?;
        Ok(Self { endpoints, config })
    }

    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    #[must_use]
    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Effective quorum threshold for the configured endpoints.
    #[must_use]
    pub fn min_responses(&self) -> usize {
        self.config.min_responses_for(self.endpoints.len())
    }

    /// Dispatches `method` with a fresh total deadline.
    ///
    /// # Errors
    ///
    /// Returns [`ConsensusError::Unresolved`] when every endpoint reported and `resolver` still
    /// could not commit to a value.
    pub async fn dispatch<T, R>(
        &self,
        resolver: &R,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, ConsensusError>
    where
        T: DeserializeOwned + Send + 'static,
        R: Resolver<T> + ?Sized,
    {
        let deadline = Instant::now() + self.config.total_timeout();
        self.dispatch_with_deadline(deadline, resolver, method, params).await
    }

    /// Dispatches `method` to every endpoint, bounding each call by `deadline`.
    ///
    /// Trailing `null` parameters are dropped before sending. The graceful deadline starts
    /// counting when this function is called.
    ///
    /// # Errors
    ///
    /// Returns [`ConsensusError::Unresolved`] when every endpoint reported and `resolver` still
    /// could not commit to a value.
    pub async fn dispatch_with_deadline<T, R>(
        &self,
        deadline: Instant,
        resolver: &R,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, ConsensusError>
    where
        T: DeserializeOwned + Send + 'static,
        R: Resolver<T> + ?Sized,
    {
        let endpoints = self.endpoints.len();
        let method: Arc<str> = Arc::from(method);
        let params: Arc<[Value]> = trim_trailing_nulls(params).into();

        let (tx, mut rx) = mpsc::channel::<Outcome<T>>(endpoints.max(1));
        let mut tasks = JoinSet::new();
        for endpoint in &self.endpoints {
            let endpoint = Arc::clone(endpoint);
            let method = Arc::clone(&method);
            let params = Arc::clone(&params);
            let tx = tx.clone();
            tasks.spawn(async move {
                let outcome =
                    call_endpoint::<T>(endpoint.as_ref(), &method, &params, deadline).await;
                // capacity equals the endpoint count and each task sends once
                let _ = tx.try_send(outcome);
            });
        }
        drop(tx);

        let graceful = sleep_until(Instant::now() + self.config.graceful_timeout());
        tokio::pin!(graceful);
        let mut graceful_elapsed = false;
        let mut outcomes: Vec<Outcome<T>> = Vec::with_capacity(endpoints);

        loop {
            let all_reported = tokio::select! {
                received = rx.recv() => match received {
                    Some(outcome) => {
                        outcomes.push(outcome);
                        outcomes.len() >= endpoints
                    }
                    None => true,
                },
                () = &mut graceful, if !graceful_elapsed => {
                    graceful_elapsed = true;
                    false
                }
            };

            if !all_reported && !graceful_elapsed {
                continue;
            }

            match resolver.resolve(&outcomes) {
                Ok(value) => {
                    debug!(
                        method = %method,
                        responses = outcomes.len(),
                        endpoints,
                        "dispatch resolved"
                    );
                    return Ok(value);
                }
                Err(errors) if all_reported => {
                    warn!(method = %method, error = %errors, "dispatch unresolved");
                    return Err(ConsensusError::Unresolved(errors));
                }
                Err(_) => {}
            }
        }
    }
}

/// Calls one endpoint and turns whatever happens into an [`Outcome`].
async fn call_endpoint<T: DeserializeOwned>(
    endpoint: &dyn Endpoint,
    method: &str,
    params: &[Value],
    deadline: Instant,
) -> Outcome<T> {
    let started = Instant::now();
    let call = timeout_at(deadline, endpoint.call(method, params));

    let result = match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(Ok(value))) => serde_json::from_value::<T>(value)
            .map_err(|e| UpstreamError::InvalidResponse(e.to_string())),
        Ok(Ok(Err(e))) => Err(e),
        Ok(Err(_elapsed)) => Err(UpstreamError::Timeout),
        Err(panic) => Err(UpstreamError::Panicked(panic_message(panic.as_ref()))),
    };

    let elapsed = started.elapsed();
    match &result {
        Ok(_) => debug!(
            endpoint = %endpoint.name(),
            method = %method,
            args = ?params,
            duration = ?elapsed,
            "call"
        ),
        Err(error) => warn!(
            endpoint = %endpoint.name(),
            method = %method,
            args = ?params,
            duration = ?elapsed,
            error = %error,
            "call error"
        ),
    }

    Outcome { endpoint: Arc::from(endpoint.name()), result, elapsed }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Drops trailing `null` parameters so omitted optional arguments are not sent.
#[must_use]
pub fn trim_trailing_nulls(mut params: Vec<Value>) -> Vec<Value> {
    while matches!(params.last(), Some(Value::Null)) {
        params.pop();
    }
    params
}
