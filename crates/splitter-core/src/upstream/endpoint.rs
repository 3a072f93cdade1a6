use async_trait::async_trait;
use serde_json::Value;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::{
    types::{JsonRpcRequest, JsonRpcResponse},
    upstream::http_client::HttpClient,
};

use super::errors::UpstreamError;

/// One upstream JSON-RPC node.
///
/// The dispatcher bounds every call with its own deadline and drops the future when the dispatch
/// returns, so implementations only need to be cancellation safe.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Invokes `method` with positional `params` and returns the raw `result` value.
    ///
    /// A JSON-RPC error object is returned as [`UpstreamError::RpcError`]; a `null` result is
    /// returned as [`Value::Null`].
    async fn call(&self, method: &str, params: &[Value]) -> Result<Value, UpstreamError>;
}

/// Endpoint speaking JSON-RPC 2.0 over HTTP POST.
pub struct HttpEndpoint {
    name: Arc<str>,
    url: String,
    http_client: Arc<HttpClient>,
    timeout: Duration,
    next_id: AtomicU64,
}

impl HttpEndpoint {
    /// Creates an endpoint for `url` sharing the given HTTP client.
    ///
    /// `timeout` caps a single HTTP exchange; the dispatcher's deadline still applies on top.
    #[must_use]
    pub fn new(
        name: impl Into<Arc<str>>,
        url: impl Into<String>,
        http_client: Arc<HttpClient>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            http_client,
            timeout,
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Endpoint for HttpEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, method: &str, params: &[Value]) -> Result<Value, UpstreamError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request =
            JsonRpcRequest::new(method, Some(Value::Array(params.to_vec())), Value::from(id));

        let body = serde_json::to_vec(&request).map_err(|e| {
            UpstreamError::InvalidRequest(format!("failed to serialize request: {e}"))
        })?;

        let response_bytes = self
            .http_client
            .send_request(&self.url, bytes::Bytes::from(body), self.timeout)
            .await?;

        let response: JsonRpcResponse = serde_json::from_slice(&response_bytes)
            .map_err(|e| UpstreamError::InvalidResponse(format!("invalid JSON: {e}")))?;

        if let Some(error) = response.error {
            return Err(UpstreamError::RpcError(error.code, error.message));
        }

        Ok(response.result.unwrap_or(Value::Null))
    }
}
