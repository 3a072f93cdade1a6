//! Proxy module for JSON-RPC request processing and routing.
//!
//! # Main Components
//!
//! - `ProxyEngine`: validates requests, decodes parameters and routes them to the façade
//! - `EthApi`: one typed method per served RPC method, each with its own resolver
//! - `TagResolver`: pins `latest`/`pending` to one block number before dispatch
//! - `Params`: positional parameter decoding
//! - `ProxyError`: error types mapped onto JSON-RPC error codes
//!
//! # Request Processing Flow
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────┐
//! │  Validation │ ─── Invalid / unsupported ──► Error Response
//! └──────┬──────┘
//!        │ Valid
//!        ▼
//! ┌─────────────────┐
//! │   ProxyEngine   │
//! │  Params decode  │ ─── Bad params ──► -32602
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐      ┌──────────────┐
//! │     EthApi      │ ───► │ TagResolver  │ (block-scoped methods only)
//! └────────┬────────┘      └──────┬───────┘
//!          │                      │ eth_blockNumber
//!          ▼                      ▼
//!      Dispatcher ◄───────────────┘
//!          │
//!          ▼
//!  value │ aggregated error (-32000)
//! ```

pub mod api;
pub mod engine;
pub mod errors;
pub mod params;
pub mod tags;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;

pub use api::EthApi;
pub use engine::ProxyEngine;
pub use errors::ProxyError;
pub use params::Params;
pub use tags::{TagResolver, TagSession};
