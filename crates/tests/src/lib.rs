//! Integration Tests for the JSON-RPC Splitter
//!
//! Every test runs the real HTTP server in front of mockito upstreams:
//!
//! - `splitter_tests`: agreement, disagreement, failing upstreams, batches and health
//! - `tag_normalization_tests`: block tag pinning against upstreams that report a tip
//! - `mock_infrastructure`: reusable mock upstreams and the server harness
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```

#[cfg(test)]
mod splitter_tests;

#[cfg(test)]
mod tag_normalization_tests;

/// Mock infrastructure for testing
pub mod mock_infrastructure;
