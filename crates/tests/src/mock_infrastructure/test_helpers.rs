//! Test Helper Functions and Utilities
//!
//! Starts a splitter on an ephemeral port in front of mock upstreams and talks to it over HTTP.

use serde_json::{json, Value};
use splitter_core::{
    config::{AppConfig, UpstreamProvider},
    proxy::ProxyEngine,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::task::JoinHandle;

/// A running splitter bound to a local ephemeral port.
pub struct TestSplitter {
    addr: SocketAddr,
    client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestSplitter {
    /// Starts a splitter with one upstream per URL and otherwise default configuration.
    pub async fn start(urls: &[String]) -> Self {
        Self::start_with(urls, |_| {}).await
    }

    /// Starts a splitter after letting `customize` adjust the configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid or the listener cannot be bound.
    pub async fn start_with(urls: &[String], customize: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.upstreams.providers = urls
            .iter()
            .enumerate()
            .map(|(index, url)| UpstreamProvider::new(format!("mock-{index}"), url.as_str()))
            .collect();
        customize(&mut config);

        let engine = Arc::new(ProxyEngine::from_config(&config).expect("valid test config"));
        let app = server::create_app(engine, &config);

        let listener =
            tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
        let addr = listener.local_addr().expect("local address");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, client: reqwest::Client::new(), handle }
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Posts a raw JSON payload and returns the decoded JSON answer.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the answer is not JSON.
    pub async fn post(&self, payload: &Value) -> Value {
        self.client
            .post(self.url())
            .json(payload)
            .send()
            .await
            .expect("splitter reachable")
            .json()
            .await
            .expect("JSON answer")
    }

    /// Calls one method with id `1`.
    pub async fn call(&self, method: &str, params: Value) -> Value {
        self.post(&rpc_request(1, method, params)).await
    }

    /// Fetches `GET /health`.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the answer is not JSON.
    pub async fn health(&self) -> Value {
        self.client
            .get(format!("{}/health", self.url()))
            .send()
            .await
            .expect("splitter reachable")
            .json()
            .await
            .expect("JSON answer")
    }
}

impl Drop for TestSplitter {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Builds a JSON-RPC request object.
#[must_use]
pub fn rpc_request(id: u64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": id
    })
}

/// Creates a single test log.
#[must_use]
pub fn create_test_log(block_number: u64, log_index: u64) -> Value {
    json!({
        "address": "0x0000000000000000000000000000000000000001",
        "blockNumber": format!("0x{:x}", block_number),
        "blockHash": format!("0x{:064x}", block_number),
        "logIndex": format!("0x{:x}", log_index),
        "transactionHash": format!("0x{:064x}", block_number * 100 + log_index),
        "transactionIndex": "0x0",
        "topics": [format!("0x{:064x}", log_index)],
        "data": "0x",
        "removed": false
    })
}
