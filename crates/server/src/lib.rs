//! HTTP front end for the splitter.
//!
//! Exposes `POST /` for JSON-RPC (single and batch) and `GET /health`, wrapped in the
//! transport layers configured by [`ServerConfig`](splitter_core::config::ServerConfig).

pub mod router;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use splitter_core::{config::AppConfig, proxy::ProxyEngine};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
};

/// Maximum accepted request body size.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Builds the application router.
///
/// Layers applied to the RPC route, outermost first: optional CORS, panic recovery, body-size
/// limit and the concurrency limit.
pub fn create_app(proxy_engine: Arc<ProxyEngine>, config: &AppConfig) -> Router {
    let public = Router::new()
        .route("/health", get(router::handle_health))
        .with_state(Arc::clone(&proxy_engine));

    let mut rpc = Router::new()
        .route("/", post(router::handle_rpc))
        .with_state(proxy_engine)
        .layer(ConcurrencyLimitLayer::new(config.server.max_concurrent_requests))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::new());

    if config.server.enable_cors {
        rpc = rpc.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_headers([CONTENT_TYPE])
                .allow_methods([Method::POST]),
        );
    }

    public.merge(rpc)
}
