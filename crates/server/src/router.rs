use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;
use splitter_core::{
    proxy::ProxyEngine,
    types::{JsonRpcRequest, JsonRpcResponse, INVALID_REQUEST, PARSE_ERROR},
};
use std::sync::Arc;
use tracing::debug;

type RpcResponse = (StatusCode, Json<Value>);

fn encode<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn error_body(code: i32, message: String, id: Arc<Value>) -> Value {
    encode(&JsonRpcResponse::error(code, message, id))
}

/// Handles JSON-RPC requests (single or batched).
///
/// The body is parsed here rather than by the `Json` extractor so that malformed JSON is answered
/// with a JSON-RPC parse error (`-32700`) instead of a plain-text rejection. A batch is an array
/// of request objects; its items run concurrently and are answered in request order.
pub async fn handle_rpc(
    State(proxy_engine): State<Arc<ProxyEngine>>,
    body: Bytes,
) -> impl IntoResponse {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!(error = %e, "unparseable request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(error_body(PARSE_ERROR, format!("Parse error: {e}"), Arc::new(Value::Null))),
            );
        }
    };

    match payload {
        Value::Array(items) => handle_batch_request(proxy_engine, items).await,
        payload => handle_single_request(proxy_engine, payload).await,
    }
}

async fn handle_single_request(proxy_engine: Arc<ProxyEngine>, payload: Value) -> RpcResponse {
    (StatusCode::OK, Json(process_item(proxy_engine, payload).await))
}

/// Processes one request object, answering `-32600` when it is not a valid request.
async fn process_item(proxy_engine: Arc<ProxyEngine>, item: Value) -> Value {
    let item_id = match &item {
        Value::Object(map) => Arc::new(map.get("id").cloned().unwrap_or(Value::Null)),
        _ => Arc::new(Value::Null),
    };

    match serde_json::from_value::<JsonRpcRequest>(item) {
        Ok(request) => encode(&proxy_engine.handle(request).await),
        Err(e) => error_body(INVALID_REQUEST, format!("Invalid request: {e}"), item_id),
    }
}

async fn handle_batch_request(proxy_engine: Arc<ProxyEngine>, items: Vec<Value>) -> RpcResponse {
    if items.is_empty() {
        return (
            StatusCode::OK,
            Json(error_body(
                INVALID_REQUEST,
                "Invalid request: empty batch".to_string(),
                Arc::new(Value::Null),
            )),
        );
    }

    debug!(batch_size = items.len(), "received batch request");

    // join_all keeps input order
    let futures = items.into_iter().map(|item| process_item(Arc::clone(&proxy_engine), item));
    let responses = futures::future::join_all(futures).await;

    (StatusCode::OK, Json(Value::Array(responses)))
}

/// Liveness probe reporting the number of configured endpoints.
#[allow(clippy::unused_async)]
pub async fn handle_health(State(proxy_engine): State<Arc<ProxyEngine>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "endpoints": proxy_engine.endpoint_count(),
        })),
    )
}
