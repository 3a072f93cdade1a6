//! Ethereum JSON-RPC result and parameter shapes.
//!
//! Quantities are decoded into `alloy-primitives` integers, so `"0x01"` and `"0x1"` decode to the
//! same value and re-encode canonically. Fields this crate does not model are kept in `other` and
//! forwarded untouched, which also makes them part of majority comparison.

use crate::utils::BlockParameter;
use alloy_primitives::{Address, Bloom, Bytes, B256, B64, U256, U64};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A block as returned by `eth_getBlockByHash` / `eth_getBlockByNumber`.
///
/// `Tx` is [`B256`] when only transaction hashes were requested and [`Transaction`] when full
/// transaction objects were requested. For the `pending` block nodes report `hash` and `miner` as
/// `null`; those stay `null` on the way out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block<Tx> {
    pub number: U64,
    #[serde(default)]
    pub hash: Option<B256>,
    pub parent_hash: B256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<B64>,
    pub sha3_uncles: B256,
    pub logs_bloom: Bloom,
    pub transactions_root: B256,
    pub state_root: B256,
    pub receipts_root: B256,
    #[serde(default)]
    pub miner: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mix_hash: Option<B256>,
    pub difficulty: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_difficulty: Option<U256>,
    pub extra_data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<U64>,
    pub gas_limit: U256,
    pub gas_used: U256,
    pub timestamp: U64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<U256>,
    #[serde(default = "Vec::new")]
    pub transactions: Vec<Tx>,
    #[serde(default)]
    pub uncles: Vec<B256>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// A block with either hashes or full transaction objects, depending on the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RichBlock {
    Hashes(Block<B256>),
    Full(Block<Transaction>),
}

/// A transaction object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: B256,
    #[serde(default)]
    pub block_hash: Option<B256>,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub transaction_index: Option<U64>,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    pub gas: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    pub input: Bytes,
    pub nonce: U64,
    pub value: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<U256>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// A log entry emitted by a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    #[serde(default)]
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default)]
    pub block_hash: Option<B256>,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
    #[serde(default)]
    pub transaction_index: Option<U64>,
    #[serde(default)]
    pub log_index: Option<U64>,
    #[serde(default)]
    pub removed: bool,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// A transaction receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub transaction_index: U64,
    pub block_hash: B256,
    pub block_number: U64,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    pub cumulative_gas_used: U256,
    pub gas_used: U256,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub logs: Vec<Log>,
    pub logs_bloom: Bloom,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<U64>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Result of `eth_feeHistory`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeHistory {
    pub oldest_block: U64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<Vec<Vec<U256>>>,
    #[serde(default)]
    pub base_fee_per_gas: Vec<U256>,
    #[serde(default)]
    pub gas_used_ratio: Vec<f64>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Filter object accepted by `eth_getLogs`.
///
/// `address` and `topics` are forwarded as given; only the block range is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_block: Option<BlockParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_block: Option<BlockParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Value>>,
    #[serde(default, alias = "blockhash", skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
}
