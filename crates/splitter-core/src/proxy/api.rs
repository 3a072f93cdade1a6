//! Typed per-method façade over the dispatcher.
//!
//! Each method fixes the decode target, the resolver and whether block tags are normalized
//! first. Tag resolution and the main dispatch share one total deadline.
//!
//! | Method                     | Result                      | Resolver     | Tags          |
//! |----------------------------|-----------------------------|--------------|---------------|
//! | `eth_blockNumber`          | `U64`                       | block number | -             |
//! | `eth_getBlockByHash`       | `Option<RichBlock>`         | majority     | -             |
//! | `eth_getBlockByNumber`     | `Option<RichBlock>`         | majority     | -             |
//! | `eth_getTransactionByHash` | `Option<Transaction>`       | majority     | -             |
//! | `eth_getTransactionCount`  | `U256`                      | majority     | yes           |
//! | `eth_getTransactionReceipt`| `Option<TransactionReceipt>`| majority     | -             |
//! | `eth_sendRawTransaction`   | `B256`                      | majority     | -             |
//! | `eth_getBalance`           | `U256`                      | majority     | yes           |
//! | `eth_getCode`              | `Bytes`                     | majority     | yes           |
//! | `eth_getStorageAt`         | `B256`                      | majority     | yes           |
//! | `eth_call`                 | `Bytes`                     | majority     | yes           |
//! | `eth_getLogs`              | `Vec<Log>`                  | majority     | both ends     |
//! | `eth_gasPrice`             | `U256`                      | median       | -             |
//! | `eth_estimateGas`          | `U256`                      | median       | yes           |
//! | `eth_feeHistory`           | `FeeHistory`                | majority     | yes           |
//! | `eth_maxPriorityFeePerGas` | `U256`                      | median       | -             |
//! | `eth_chainId`              | `U64`                       | majority     | -             |
//! | `net_version`              | `Value`                     | majority     | -             |

use super::{errors::ProxyError, tags::TagResolver};
use crate::{
    eth::{Block, FeeHistory, Log, LogFilter, RichBlock, Transaction, TransactionReceipt},
    upstream::consensus::{
        BlockNumberResolver, Dispatcher, MajorityResolver, MedianResolver, Quantity,
    },
    utils::BlockParameter,
};
use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::Instant;

fn param<T: Serialize>(value: T) -> Result<Value, ProxyError> {
    serde_json::to_value(value)
        .map_err(|e| ProxyError::Internal(format!("failed to encode parameter: {e}")))
}

/// Ethereum JSON-RPC methods answered by quorum across all endpoints.
pub struct EthApi {
    dispatcher: Arc<Dispatcher>,
    majority: MajorityResolver,
    median: MedianResolver,
    block_number: BlockNumberResolver,
    tags: TagResolver,
}

impl EthApi {
    /// Creates the façade, deriving every resolver's quorum from the dispatcher configuration.
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        let min_responses = dispatcher.min_responses();
        let block_number =
            BlockNumberResolver::new(min_responses, dispatcher.config().max_blocks_behind);

        Self {
            tags: TagResolver::new(Arc::clone(&dispatcher), block_number),
            majority: MajorityResolver::new(min_responses),
            median: MedianResolver::new(min_responses),
            block_number,
            dispatcher,
        }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    fn deadline(&self) -> Instant {
        Instant::now() + self.dispatcher.config().total_timeout()
    }

    async fn majority<T>(
        &self,
        deadline: Instant,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, ProxyError>
    where
        T: DeserializeOwned + Serialize + Clone + Send + Sync + 'static,
    {
        Ok(self.dispatcher.dispatch_with_deadline(deadline, &self.majority, method, params).await?)
    }

    async fn median<T>(
        &self,
        deadline: Instant,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, ProxyError>
    where
        T: DeserializeOwned + Quantity + 'static,
    {
        Ok(self.dispatcher.dispatch_with_deadline(deadline, &self.median, method, params).await?)
    }

    /// Dispatches a call whose last positional parameter is a block, normalizing it first.
    async fn majority_at<T>(
        &self,
        method: &str,
        mut params: Vec<Value>,
        block: BlockParameter,
    ) -> Result<T, ProxyError>
    where
        T: DeserializeOwned + Serialize + Clone + Send + Sync + 'static,
    {
        let deadline = self.deadline();
        let block = self.tags.session(deadline).normalize(block).await?;
        params.push(param(block)?);
        self.majority(deadline, method, params).await
    }

    /// `eth_blockNumber`
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Consensus`] if the endpoints cannot be resolved.
    pub async fn block_number(&self) -> Result<U64, ProxyError> {
        Ok(self
            .dispatcher
            .dispatch_with_deadline(self.deadline(), &self.block_number, "eth_blockNumber", vec![])
            .await?)
    }

    /// `eth_getBlockByHash`
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Consensus`] if the endpoints cannot be resolved.
    pub async fn get_block_by_hash(
        &self,
        hash: B256,
        full: bool,
    ) -> Result<Option<RichBlock>, ProxyError> {
        self.get_block("eth_getBlockByHash", param(hash)?, full).await
    }

    /// `eth_getBlockByNumber`
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Consensus`] if the endpoints cannot be resolved.
    pub async fn get_block_by_number(
        &self,
        block: BlockParameter,
        full: bool,
    ) -> Result<Option<RichBlock>, ProxyError> {
        self.get_block("eth_getBlockByNumber", param(block)?, full).await
    }

    async fn get_block(
        &self,
        method: &str,
        block: Value,
        full: bool,
    ) -> Result<Option<RichBlock>, ProxyError> {
        let deadline = self.deadline();
        let params = vec![block, Value::Bool(full)];
        if full {
            let block: Option<Block<Transaction>> = self.majority(deadline, method, params).await?;
            Ok(block.map(RichBlock::Full))
        } else {
            let block: Option<Block<B256>> = self.majority(deadline, method, params).await?;
            Ok(block.map(RichBlock::Hashes))
        }
    }

    /// `eth_getTransactionByHash`
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Consensus`] if the endpoints cannot be resolved.
    pub async fn get_transaction_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<Transaction>, ProxyError> {
        self.majority(self.deadline(), "eth_getTransactionByHash", vec![param(hash)?]).await
    }

    /// `eth_getTransactionCount`
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::UnsupportedTag`] or [`ProxyError::Consensus`].
    pub async fn get_transaction_count(
        &self,
        address: Address,
        block: BlockParameter,
    ) -> Result<U256, ProxyError> {
        self.majority_at("eth_getTransactionCount", vec![param(address)?], block).await
    }

    /// `eth_getTransactionReceipt`
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Consensus`] if the endpoints cannot be resolved.
    pub async fn get_transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ProxyError> {
        self.majority(self.deadline(), "eth_getTransactionReceipt", vec![param(hash)?]).await
    }

    /// `eth_sendRawTransaction`
    ///
    /// The transaction is broadcast through every endpoint; the hash they agree on is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Consensus`] if the endpoints cannot be resolved.
    pub async fn send_raw_transaction(&self, data: Bytes) -> Result<B256, ProxyError> {
        self.majority(self.deadline(), "eth_sendRawTransaction", vec![param(data)?]).await
    }

    /// `eth_getBalance`
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::UnsupportedTag`] or [`ProxyError::Consensus`].
    pub async fn get_balance(
        &self,
        address: Address,
        block: BlockParameter,
    ) -> Result<U256, ProxyError> {
        self.majority_at("eth_getBalance", vec![param(address)?], block).await
    }

    /// `eth_getCode`
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::UnsupportedTag`] or [`ProxyError::Consensus`].
    pub async fn get_code(
        &self,
        address: Address,
        block: BlockParameter,
    ) -> Result<Bytes, ProxyError> {
        self.majority_at("eth_getCode", vec![param(address)?], block).await
    }

    /// `eth_getStorageAt`
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::UnsupportedTag`] or [`ProxyError::Consensus`].
    pub async fn get_storage_at(
        &self,
        address: Address,
        position: U256,
        block: BlockParameter,
    ) -> Result<B256, ProxyError> {
        self.majority_at("eth_getStorageAt", vec![param(address)?, param(position)?], block).await
    }

    /// `eth_call`
    ///
    /// The call object and the optional state override set are forwarded as given.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::UnsupportedTag`] or [`ProxyError::Consensus`].
    pub async fn call(
        &self,
        call: Value,
        block: BlockParameter,
        overrides: Option<Value>,
    ) -> Result<Bytes, ProxyError> {
        let deadline = self.deadline();
        let block = self.tags.session(deadline).normalize(block).await?;
        let params = vec![call, param(block)?, overrides.unwrap_or(Value::Null)];
        self.majority(deadline, "eth_call", params).await
    }

    /// `eth_getLogs`
    ///
    /// Both range ends are normalized against the same tip. Absent ends stay absent.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::UnsupportedTag`] or [`ProxyError::Consensus`].
    pub async fn get_logs(&self, mut filter: LogFilter) -> Result<Vec<Log>, ProxyError> {
        let deadline = self.deadline();
        let mut session = self.tags.session(deadline);
        filter.from_block = session.normalize_opt(filter.from_block).await?;
        filter.to_block = session.normalize_opt(filter.to_block).await?;

        self.majority(deadline, "eth_getLogs", vec![param(filter)?]).await
    }

    /// `eth_gasPrice`
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Consensus`] if too few endpoints answered.
    pub async fn gas_price(&self) -> Result<U256, ProxyError> {
        self.median(self.deadline(), "eth_gasPrice", vec![]).await
    }

    /// `eth_estimateGas`
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::UnsupportedTag`] or [`ProxyError::Consensus`].
    pub async fn estimate_gas(
        &self,
        call: Value,
        block: BlockParameter,
    ) -> Result<U256, ProxyError> {
        let deadline = self.deadline();
        let block = self.tags.session(deadline).normalize(block).await?;
        self.median(deadline, "eth_estimateGas", vec![call, param(block)?]).await
    }

    /// `eth_feeHistory`
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::UnsupportedTag`] or [`ProxyError::Consensus`].
    pub async fn fee_history(
        &self,
        block_count: U64,
        newest_block: BlockParameter,
        reward_percentiles: Option<Value>,
    ) -> Result<FeeHistory, ProxyError> {
        let deadline = self.deadline();
        let newest_block = self.tags.session(deadline).normalize(newest_block).await?;
        let params = vec![
            param(block_count)?,
            param(newest_block)?,
            reward_percentiles.unwrap_or(Value::Null),
        ];
        self.majority(deadline, "eth_feeHistory", params).await
    }

    /// `eth_maxPriorityFeePerGas`
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Consensus`] if too few endpoints answered.
    pub async fn max_priority_fee_per_gas(&self) -> Result<U256, ProxyError> {
        self.median(self.deadline(), "eth_maxPriorityFeePerGas", vec![]).await
    }

    /// `eth_chainId`
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Consensus`] if the endpoints cannot be resolved.
    pub async fn chain_id(&self) -> Result<U64, ProxyError> {
        self.majority(self.deadline(), "eth_chainId", vec![]).await
    }

    /// `net_version`
    ///
    /// Passed through as raw JSON; some nodes answer with a number instead of a string.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Consensus`] if the endpoints cannot be resolved.
    pub async fn net_version(&self) -> Result<Value, ProxyError> {
        self.majority(self.deadline(), "net_version", vec![]).await
    }
}
