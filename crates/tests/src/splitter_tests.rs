//! End-to-end tests over HTTP.
//!
//! A splitter is started on an ephemeral port with mockito servers as upstreams, and requests are
//! sent with a plain HTTP client:
//! - Agreeing upstreams produce the shared answer
//! - Disagreeing or failing upstreams produce a `-32000` error with the aggregated message
//! - A minority of failing upstreams is tolerated
//! - Batches are answered in request order

use crate::mock_infrastructure::{rpc_request, RpcMockBuilder, TestSplitter};
use serde_json::{json, Value};

async fn upstreams_answering(method: &str, results: &[Value]) -> Vec<RpcMockBuilder> {
    let mut mocks = Vec::with_capacity(results.len());
    for result in results {
        let mut mock = RpcMockBuilder::new().await;
        mock.mock_method(method, result);
        mocks.push(mock);
    }
    mocks
}

fn urls(mocks: &[RpcMockBuilder]) -> Vec<String> {
    mocks.iter().map(RpcMockBuilder::url).collect()
}

#[tokio::test]
async fn test_agreeing_upstreams_answer() {
    let mocks =
        upstreams_answering("eth_chainId", &[json!("0x1"), json!("0x1"), json!("0x1")]).await;
    let splitter = TestSplitter::start(&urls(&mocks)).await;

    let answer = splitter.call("eth_chainId", json!([])).await;

    assert_eq!(answer, json!({"jsonrpc": "2.0", "result": "0x1", "id": 1}));
}

#[tokio::test]
async fn test_majority_wins_over_outlier() {
    let mocks = upstreams_answering("net_version", &[json!("1"), json!("5"), json!("1")]).await;
    let splitter = TestSplitter::start(&urls(&mocks)).await;

    let answer = splitter.call("net_version", json!([])).await;

    assert_eq!(answer["result"], json!("1"));
}

#[tokio::test]
async fn test_disagreeing_upstreams_return_error() {
    let mocks =
        upstreams_answering("eth_chainId", &[json!("0x1"), json!("0x2"), json!("0x3")]).await;
    let splitter = TestSplitter::start(&urls(&mocks)).await;

    let answer = splitter.call("eth_chainId", json!([])).await;

    assert!(answer.get("result").is_none());
    assert_eq!(answer["error"]["code"], json!(-32000));
    assert_eq!(answer["error"]["message"], json!("RPC servers returned different responses"));
    assert_eq!(answer["id"], json!(1));
}

#[tokio::test]
async fn test_failing_minority_is_tolerated() {
    let mut mocks = upstreams_answering("eth_gasPrice", &[json!("0x64"), json!("0xc8")]).await;
    let mut failing = RpcMockBuilder::new().await;
    failing.mock_server_error();
    mocks.push(failing);
    let splitter = TestSplitter::start(&urls(&mocks)).await;

    let answer = splitter.call("eth_gasPrice", json!([])).await;

    // median of the two successful answers
    assert_eq!(answer["result"], json!("0x96"));
}

#[tokio::test]
async fn test_all_upstreams_failing_aggregates_errors() {
    let mut mocks = Vec::new();
    for _ in 0..2 {
        let mut mock = RpcMockBuilder::new().await;
        mock.mock_server_error();
        mocks.push(mock);
    }
    let mut rpc_failure = RpcMockBuilder::new().await;
    rpc_failure.mock_rpc_error("eth_chainId", -32005, "limit exceeded");
    mocks.push(rpc_failure);
    let splitter = TestSplitter::start(&urls(&mocks)).await;

    let answer = splitter.call("eth_chainId", json!([])).await;

    assert_eq!(answer["error"]["code"], json!(-32000));
    let message = answer["error"]["message"].as_str().unwrap_or_default();
    assert!(message.starts_with("the following errors occurred: [not enough responses"));
    assert!(message.contains("HTTP error 500"));
    assert!(message.contains("limit exceeded"));
    // identical messages from the two 500s are listed once
    assert_eq!(message.matches("HTTP error 500").count(), 1);
}

#[tokio::test]
async fn test_batch_answers_in_request_order() {
    let mut mocks = Vec::new();
    for _ in 0..3 {
        let mut mock = RpcMockBuilder::new().await;
        mock.mock_method("eth_chainId", &json!("0x1"))
            .mock_method("net_version", &json!("1"))
            .mock_method("eth_gasPrice", &json!("0x3b9aca00"));
        mocks.push(mock);
    }
    let splitter = TestSplitter::start(&urls(&mocks)).await;

    let answer = splitter
        .post(&json!([
            rpc_request(10, "eth_gasPrice", json!([])),
            rpc_request(11, "eth_accounts", json!([])),
            rpc_request(12, "net_version", json!([])),
            rpc_request(13, "eth_chainId", json!([])),
        ]))
        .await;

    let responses = answer.as_array().cloned().unwrap_or_default();
    assert_eq!(responses.len(), 4);
    let ids: Vec<&Value> = responses.iter().map(|r| &r["id"]).collect();
    assert_eq!(ids, [&json!(10), &json!(11), &json!(12), &json!(13)]);
    assert_eq!(responses[0]["result"], json!("0x3b9aca00"));
    assert_eq!(responses[1]["error"]["code"], json!(-32601));
    assert_eq!(responses[2]["result"], json!("1"));
    assert_eq!(responses[3]["result"], json!("0x1"));
}

#[tokio::test]
async fn test_health_reports_endpoints() {
    let mocks = upstreams_answering("eth_chainId", &[json!("0x1"), json!("0x1")]).await;
    let splitter = TestSplitter::start(&urls(&mocks)).await;

    assert_eq!(splitter.health().await, json!({"status": "ok", "endpoints": 2}));
}

#[tokio::test]
async fn test_explicit_min_responses_requires_every_upstream() {
    let mocks =
        upstreams_answering("eth_chainId", &[json!("0x1"), json!("0x1"), json!("0x2")]).await;
    let splitter =
        TestSplitter::start_with(&urls(&mocks), |config| config.consensus.min_responses = Some(3))
            .await;

    let answer = splitter.call("eth_chainId", json!([])).await;

    assert_eq!(answer["error"]["message"], json!("RPC servers returned different responses"));
}
