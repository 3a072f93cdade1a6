//! # Splitter Core
//!
//! Core library for the RPC splitter, a fault-tolerant JSON-RPC gateway for EVM nodes.
//!
//! Every inbound call is fanned out to all configured upstream endpoints. The answers are
//! collected concurrently and folded into one authoritative response by a method-specific
//! resolver, so a lagging, failing or lying node does not reach the caller.
//!
//! - **[`upstream`]**: Endpoint abstraction, the HTTP endpoint client and the
//!   [`consensus`](upstream::consensus) machinery (dispatcher, resolvers, comparator, error
//!   aggregation).
//!
//! - **[`proxy`]**: Per-method façade ([`proxy::EthApi`]), block tag normalization and the
//!   JSON-RPC request router ([`proxy::ProxyEngine`]).
//!
//! - **[`eth`]**: Typed Ethereum wire shapes (blocks, transactions, receipts, logs, fee history)
//!   and block parameters.
//!
//! - **[`config`]**: Layered application configuration.
//!
//! ## Request Flow
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────┐
//! │ ProxyEngine │ ─── Unknown method / bad params ──► Error Response
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐       ┌──────────────────────────┐
//! │   EthApi    │ ────► │ TagResolver              │
//! │  (façade)   │       │ latest/pending ─► number │
//! └──────┬──────┘       └────────────┬─────────────┘
//!        │                           │ nested eth_blockNumber
//!        ▼                           ▼
//! ┌──────────────────────────────────────────────┐
//! │                  Dispatcher                  │
//! │   ┌──────────┐  ┌──────────┐  ┌──────────┐   │
//! │   │Endpoint 1│  │Endpoint 2│  │Endpoint N│   │
//! │   └────┬─────┘  └────┬─────┘  └────┬─────┘   │
//! │        └──── outcomes channel ─────┘         │
//! │                     │                        │
//! │                     ▼                        │
//! │   Resolver (majority / median / staleness)   │
//! └─────────────────────┬────────────────────────┘
//!                       │
//!                       ▼
//!          value or aggregated error
//! ```

pub mod config;
pub mod eth;
pub mod proxy;
pub mod types;
pub mod upstream;
pub mod utils;
