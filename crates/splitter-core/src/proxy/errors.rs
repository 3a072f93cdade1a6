use crate::{
    types::{
        JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
        SERVER_ERROR,
    },
    upstream::consensus::ConsensusError,
    utils::BlockTag,
};
use serde_json::Value;
use std::sync::Arc;

/// Errors surfaced to the splitter's own clients.
///
/// Endpoint failures never appear here directly; they only contribute to the aggregated message
/// of [`ProxyError::Consensus`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProxyError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not supported: {0}")]
    MethodNotSupported(String),

    #[error("{0}")]
    InvalidParams(String),

    /// A block tag that cannot be pinned to one height across all endpoints.
    #[error("{0} tag is not supported")]
    UnsupportedTag(BlockTag),

    /// The dispatch could not be resolved; the message is the aggregated error text.
    #[error("{0}")]
    Consensus(#[from] ConsensusError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// JSON-RPC error code for this error.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidRequest(_) => INVALID_REQUEST,
            Self::MethodNotSupported(_) => METHOD_NOT_FOUND,
            Self::InvalidParams(_) | Self::UnsupportedTag(_) => INVALID_PARAMS,
            Self::Consensus(_) => SERVER_ERROR,
            Self::Internal(_) => INTERNAL_ERROR,
        }
    }

    /// Converts the error into a JSON-RPC error response for request `id`.
    #[must_use]
    pub fn to_response(&self, id: Arc<Value>) -> JsonRpcResponse {
        JsonRpcResponse::error(self.code(), self.to_string(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::consensus::{ErrorList, DIFFERENT_RESPONSES};
    use serde_json::json;

    #[test]
    fn test_error_codes() {
        assert_eq!(ProxyError::InvalidRequest("x".into()).code(), -32600);
        assert_eq!(ProxyError::MethodNotSupported("eth_foo".into()).code(), -32601);
        assert_eq!(ProxyError::InvalidParams("x".into()).code(), -32602);
        assert_eq!(ProxyError::UnsupportedTag(BlockTag::Earliest).code(), -32602);
        assert_eq!(ProxyError::Internal("x".into()).code(), -32603);
    }

    #[test]
    fn test_unsupported_tag_message() {
        let error = ProxyError::UnsupportedTag(BlockTag::Earliest);
        assert_eq!(error.to_string(), "earliest tag is not supported");
    }

    #[test]
    fn test_consensus_error_response_carries_aggregated_text() {
        let error = ProxyError::from(ConsensusError::from(
            ErrorList::from_message(DIFFERENT_RESPONSES).with("RPC error -32000: boom"),
        ));

        let response = error.to_response(Arc::new(json!(7)));
        let rpc_error = response.error.as_ref().map(|e| (e.code, e.message.clone()));

        assert_eq!(
            rpc_error,
            Some((
                -32000,
                "the following errors occurred: \
                 [RPC servers returned different responses, RPC error -32000: boom]"
                    .to_string()
            ))
        );
        assert_eq!(*response.id, json!(7));
    }
}
