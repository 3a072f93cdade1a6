use thiserror::Error;

/// Errors that can occur when calling a single upstream RPC endpoint.
///
/// These never abort a dispatch; they are folded into the endpoint's outcome and end up in the
/// aggregated error message when no answer can be resolved.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum UpstreamError {
    /// Request exceeded the dispatch deadline.
    #[error("request timeout")]
    Timeout,

    /// Failed to establish a connection to the upstream endpoint.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP-level error occurred (non-2xx status code).
    ///
    /// First field is the HTTP status code, second is the (truncated) response body.
    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    /// JSON-RPC error returned by the upstream provider.
    ///
    /// First field is the RPC error code, second is the error message.
    #[error("RPC error {0}: {1}")]
    RpcError(i32, String),

    /// Network-level error from the underlying HTTP client.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response from upstream could not be parsed or did not match the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Request could not be built or serialized.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Maximum concurrent requests limit has been reached.
    #[error("concurrency limit reached: {0}")]
    ConcurrencyLimit(String),

    /// The endpoint call panicked.
    #[error("panic: {0}")]
    Panicked(String),
}
