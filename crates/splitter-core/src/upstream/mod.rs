//! Upstream RPC endpoints and the consensus machinery that queries them.
//!
//! This module handles communication with upstream Ethereum RPC nodes:
//! - HTTP client with connection pooling and concurrency control
//! - The [`Endpoint`] abstraction used by the dispatcher, and its HTTP implementation
//! - Fan-out / fan-in dispatch with pluggable resolution strategies
//!
//! ## Example Flow
//!
//! ```text
//! EthApi method
//!      │
//!      ▼
//! Dispatcher ──► HttpEndpoint (node 1) ──► HttpClient ──► POST url
//!      │    ──► HttpEndpoint (node 2) ──► ...
//!      │    ──► HttpEndpoint (node N) ──► ...
//!      ▼
//! Resolver (majority │ median │ block number)
//! ```
//!
//! Every endpoint is called for every request; there is no selection, scoring or retry.

pub mod consensus;
pub mod endpoint;
pub mod errors;
pub mod http_client;

pub use consensus::{
    BlockNumberResolver, ConsensusConfig, ConsensusError, Dispatcher, ErrorList, MajorityResolver,
    MedianResolver, Outcome, Resolver,
};
pub use endpoint::{Endpoint, HttpEndpoint};
pub use errors::UpstreamError;
pub use http_client::{HttpClient, HttpClientConfig};
