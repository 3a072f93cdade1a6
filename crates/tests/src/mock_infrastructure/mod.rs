//! Mock Infrastructure for Testing the Splitter
//!
//! This module provides reusable mock upstreams and a harness that runs the splitter over real
//! HTTP.
//!
//! ## Components
//!
//! - `RpcMockBuilder`: Wraps mockito to provide Ethereum-specific RPC mocking
//! - `TestSplitter`: Serves the splitter on an ephemeral port
//! - Test helpers for common payloads
//!
//! ## Usage
//!
//! ```ignore
//! use tests::mock_infrastructure::{RpcMockBuilder, TestSplitter};
//!
//! let mut mock = RpcMockBuilder::new().await;
//! mock.mock_block_number(100);
//!
//! let splitter = TestSplitter::start(&[mock.url()]).await;
//! let answer = splitter.call("eth_blockNumber", serde_json::json!([])).await;
//! ```

pub mod rpc_mock;
pub mod test_helpers;

pub use rpc_mock::RpcMockBuilder;
pub use test_helpers::*;
