use std::{sync::Arc, time::Duration};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    types::{is_method_supported, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION},
    upstream::{
        consensus::{ConsensusConfig, Dispatcher},
        endpoint::{Endpoint, HttpEndpoint},
        http_client::HttpClient,
    },
    utils::BlockParameter,
};

use super::{api::EthApi, errors::ProxyError, params::Params};

fn to_result<T: Serialize>(value: T) -> Result<Value, ProxyError> {
    serde_json::to_value(value)
        .map_err(|e| ProxyError::Internal(format!("failed to encode result: {e}")))
}

/// Core proxy engine for processing Ethereum JSON-RPC requests.
///
/// Validates each request, decodes its positional parameters and routes it to the matching
/// [`EthApi`] method. Thread-safe and designed for concurrent use behind an `Arc`.
pub struct ProxyEngine {
    api: EthApi,
}

impl ProxyEngine {
    #[must_use]
    pub fn new(api: EthApi) -> Self {
        Self { api }
    }

    /// Builds a dispatcher over arbitrary endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Consensus`] if `consensus` cannot be met by `endpoints`.
    pub fn with_endpoints(
        endpoints: Vec<Arc<dyn Endpoint>>,
        consensus: ConsensusConfig,
    ) -> Result<Self, ProxyError> {
        let dispatcher = Dispatcher::new(endpoints, consensus)?;
        Ok(Self::new(EthApi::new(Arc::new(dispatcher))))
    }

    /// Builds the engine with one HTTP endpoint per configured provider, sharing one HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Internal`] if the HTTP client cannot be built, or
    /// [`ProxyError::Consensus`] if the consensus parameters cannot be met.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProxyError> {
        let http_client = Arc::new(
            HttpClient::new().map_err(|e| ProxyError::Internal(format!("HTTP client: {e}")))?,
        );

        let endpoints: Vec<Arc<dyn Endpoint>> = config
            .upstreams
            .providers
            .iter()
            .map(|provider| {
                info!(upstream = %provider.name, url = %provider.url, "configured upstream");
                Arc::new(HttpEndpoint::new(
                    provider.name.as_str(),
                    provider.url.as_str(),
                    Arc::clone(&http_client),
                    provider.timeout(),
                )) as Arc<dyn Endpoint>
            })
            .collect();

        Self::with_endpoints(endpoints, config.consensus.clone())
    }

    #[must_use]
    pub fn api(&self) -> &EthApi {
        &self.api
    }

    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.api.dispatcher().endpoint_count()
    }

    /// Upper bound on how long one request can take, tag resolution included.
    #[must_use]
    pub fn total_timeout(&self) -> Duration {
        self.api.dispatcher().config().total_timeout()
    }

    /// Processes a request and always produces a response, converting errors into JSON-RPC error
    /// objects.
    pub async fn handle(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = Arc::clone(&request.id);
        let method = request.method.clone();

        match self.process_request(request).await {
            Ok(response) => response,
            Err(error) => {
                debug!(method = %method, code = error.code(), error = %error, "request failed");
                error.to_response(id)
            }
        }
    }

    /// Processes an incoming JSON-RPC request with validation and routing.
    ///
    /// # Errors
    ///
    /// - [`ProxyError::InvalidRequest`] if the envelope is malformed
    /// - [`ProxyError::MethodNotSupported`] if the method is not served
    /// - [`ProxyError::InvalidParams`] / [`ProxyError::UnsupportedTag`] for bad parameters
    /// - [`ProxyError::Consensus`] if the endpoints could not be resolved
    pub async fn process_request(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, ProxyError> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Err(ProxyError::InvalidRequest(format!(
                "unsupported jsonrpc version: {}",
                request.jsonrpc
            )));
        }

        if request.method.is_empty() {
            return Err(ProxyError::InvalidRequest("missing method".to_string()));
        }

        if !is_method_supported(&request.method) {
            return Err(ProxyError::MethodNotSupported(request.method));
        }

        let params = Params::parse(request.params)?;
        let result = self.handle_request(&request.method, &params).await?;

        Ok(JsonRpcResponse::success(result, request.id))
    }

    /// Routes a supported method to the façade.
    async fn handle_request(&self, method: &str, params: &Params) -> Result<Value, ProxyError> {
        let api = &self.api;

        match method {
            "eth_blockNumber" => {
                params.ensure_at_most(0)?;
                to_result(api.block_number().await?)
            }
            "eth_getBlockByHash" => {
                params.ensure_at_most(2)?;
                to_result(api.get_block_by_hash(params.required(0)?, params.required(1)?).await?)
            }
            "eth_getBlockByNumber" => {
                params.ensure_at_most(2)?;
                let block: BlockParameter = params.required(0)?;
                to_result(api.get_block_by_number(block, params.required(1)?).await?)
            }
            "eth_getTransactionByHash" => {
                params.ensure_at_most(1)?;
                to_result(api.get_transaction_by_hash(params.required(0)?).await?)
            }
            "eth_getTransactionCount" => {
                params.ensure_at_most(2)?;
                let block: BlockParameter = params.optional(1)?.unwrap_or_default();
                to_result(api.get_transaction_count(params.required(0)?, block).await?)
            }
            "eth_getTransactionReceipt" => {
                params.ensure_at_most(1)?;
                to_result(api.get_transaction_receipt(params.required(0)?).await?)
            }
            "eth_sendRawTransaction" => {
                params.ensure_at_most(1)?;
                to_result(api.send_raw_transaction(params.required(0)?).await?)
            }
            "eth_getBalance" => {
                params.ensure_at_most(2)?;
                let block: BlockParameter = params.optional(1)?.unwrap_or_default();
                to_result(api.get_balance(params.required(0)?, block).await?)
            }
            "eth_getCode" => {
                params.ensure_at_most(2)?;
                let block: BlockParameter = params.optional(1)?.unwrap_or_default();
                to_result(api.get_code(params.required(0)?, block).await?)
            }
            "eth_getStorageAt" => {
                params.ensure_at_most(3)?;
                let block: BlockParameter = params.optional(2)?.unwrap_or_default();
                to_result(
                    api.get_storage_at(params.required(0)?, params.required(1)?, block).await?,
                )
            }
            "eth_call" => {
                params.ensure_at_most(3)?;
                let block: BlockParameter = params.optional(1)?.unwrap_or_default();
                to_result(api.call(params.required(0)?, block, params.optional(2)?).await?)
            }
            "eth_getLogs" => {
                params.ensure_at_most(1)?;
                to_result(api.get_logs(params.required(0)?).await?)
            }
            "eth_gasPrice" => {
                params.ensure_at_most(0)?;
                to_result(api.gas_price().await?)
            }
            "eth_estimateGas" => {
                params.ensure_at_most(2)?;
                let block: BlockParameter = params.optional(1)?.unwrap_or_default();
                to_result(api.estimate_gas(params.required(0)?, block).await?)
            }
            "eth_feeHistory" => {
                params.ensure_at_most(3)?;
                let history = api
                    .fee_history(params.required(0)?, params.required(1)?, params.optional(2)?)
                    .await?;
                to_result(history)
            }
            "eth_maxPriorityFeePerGas" => {
                params.ensure_at_most(0)?;
                to_result(api.max_priority_fee_per_gas().await?)
            }
            "eth_chainId" => {
                params.ensure_at_most(0)?;
                to_result(api.chain_id().await?)
            }
            "net_version" => {
                params.ensure_at_most(0)?;
                to_result(api.net_version().await?)
            }
            _ => Err(ProxyError::MethodNotSupported(method.to_string())),
        }
    }

    /// Checks if the given RPC method is served by the proxy.
    #[must_use]
    pub fn is_method_supported(method: &str) -> bool {
        is_method_supported(method)
    }
}
