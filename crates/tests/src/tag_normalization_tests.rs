//! Block tag normalization against HTTP upstreams.
//!
//! Each upstream reports a chain tip; block-scoped calls must reach every upstream with the same
//! concrete block number, fetched once per inbound call.

use crate::mock_infrastructure::{create_test_log, RpcMockBuilder, TestSplitter};
use serde_json::json;

const ADDRESS: &str = "0x0000000000000000000000000000000000000001";
const ADDRESS_PATTERN: &str = r#""0x0+1""#;

fn urls(mocks: &[RpcMockBuilder]) -> Vec<String> {
    mocks.iter().map(RpcMockBuilder::url).collect()
}

#[tokio::test]
async fn test_latest_is_pinned_with_one_lookup() {
    let mut mocks = Vec::new();
    for tip in [0x64, 0x64, 0x63] {
        let mut mock = RpcMockBuilder::new().await;
        mock.expect_block_number(tip, 1).mock_method_with_params(
            "eth_getBalance",
            &format!(r#"{ADDRESS_PATTERN},"0x63""#),
            &json!("0xde0b6b3a7640000"),
        );
        mocks.push(mock);
    }
    let splitter = TestSplitter::start(&urls(&mocks)).await;

    let answer = splitter.call("eth_getBalance", json!([ADDRESS, "latest"])).await;

    assert_eq!(answer["result"], json!("0xde0b6b3a7640000"));
    for mock in &mocks {
        mock.assert_all().await;
    }
}

#[tokio::test]
async fn test_omitted_block_is_pinned() {
    let mut mocks = Vec::new();
    for _ in 0..2 {
        let mut mock = RpcMockBuilder::new().await;
        mock.mock_block_number(0x10).mock_method_with_params(
            "eth_getTransactionCount",
            &format!(r#"{ADDRESS_PATTERN},"0x10""#),
            &json!("0x5"),
        );
        mocks.push(mock);
    }
    let splitter = TestSplitter::start(&urls(&mocks)).await;

    let answer = splitter.call("eth_getTransactionCount", json!([ADDRESS])).await;

    assert_eq!(answer["result"], json!("0x5"));
}

#[tokio::test]
async fn test_numeric_block_skips_lookup() {
    let mut mocks = Vec::new();
    for _ in 0..2 {
        let mut mock = RpcMockBuilder::new().await;
        mock.expect_block_number(0x10, 0).mock_method_with_params(
            "eth_getCode",
            &format!(r#"{ADDRESS_PATTERN},"0x8""#),
            &json!("0x6000"),
        );
        mocks.push(mock);
    }
    let splitter = TestSplitter::start(&urls(&mocks)).await;

    let answer = splitter.call("eth_getCode", json!([ADDRESS, "0x8"])).await;

    assert_eq!(answer["result"], json!("0x6000"));
    for mock in &mocks {
        mock.assert_all().await;
    }
}

#[tokio::test]
async fn test_earliest_is_rejected_without_upstream_calls() {
    let mut mocks = Vec::new();
    for _ in 0..2 {
        let mut mock = RpcMockBuilder::new().await;
        mock.expect_block_number(0x10, 0).forbid_method("eth_getBalance");
        mocks.push(mock);
    }
    let splitter = TestSplitter::start(&urls(&mocks)).await;

    let answer = splitter.call("eth_getBalance", json!([ADDRESS, "earliest"])).await;

    assert_eq!(answer["error"]["code"], json!(-32602));
    assert_eq!(answer["error"]["message"], json!("earliest tag is not supported"));
    for mock in &mocks {
        mock.assert_all().await;
    }
}

#[tokio::test]
async fn test_get_logs_pins_both_ends_to_one_tip() {
    let logs = vec![create_test_log(0x20, 0), create_test_log(0x20, 1)];
    let mut mocks = Vec::new();
    for _ in 0..3 {
        let mut mock = RpcMockBuilder::new().await;
        mock.expect_block_number(0x20, 1).mock_method_with_params(
            "eth_getLogs",
            r#"\{[^\]]*"fromBlock":"0x20"[^\]]*"toBlock":"0x20"[^\]]*\}"#,
            &json!(logs),
        );
        mocks.push(mock);
    }
    let splitter = TestSplitter::start(&urls(&mocks)).await;

    let filter = json!({"fromBlock": "latest", "toBlock": "latest", "address": ADDRESS});
    let answer = splitter.call("eth_getLogs", json!([filter])).await;

    assert_eq!(answer["result"].as_array().map(Vec::len), Some(2));
    assert_eq!(answer["result"][1]["logIndex"], json!("0x1"));
    for mock in &mocks {
        mock.assert_all().await;
    }
}

#[tokio::test]
async fn test_single_upstream_passes_tag_through() {
    let mut mock = RpcMockBuilder::new().await;
    mock.expect_block_number(0x10, 0).mock_method_with_params(
        "eth_getBalance",
        &format!(r#"{ADDRESS_PATTERN},"latest""#),
        &json!("0x1"),
    );
    let splitter = TestSplitter::start(&[mock.url()]).await;

    let answer = splitter.call("eth_getBalance", json!([ADDRESS, "latest"])).await;

    assert_eq!(answer["result"], json!("0x1"));
    mock.assert_all().await;
}
