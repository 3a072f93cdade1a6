//! Typed Ethereum wire shapes used as decode targets for dispatched calls.

pub mod types;

pub use alloy_primitives::{Address, Bytes, B256, U256, U64};
pub use types::{Block, FeeHistory, Log, LogFilter, RichBlock, Transaction, TransactionReceipt};
