//! # Consensus Overview
//!
//! Every inbound call is answered by asking all configured endpoints the same question and
//! resolving their answers into one.
//!
//! ## Dispatch Steps
//!
//! 1. **Fan-out**: trim trailing `null` params and start one task per endpoint, each bounded by
//!    the shared total deadline
//! 2. **Decode**: each task decodes its answer into the caller's result type; panics, timeouts and
//!    decode failures become error outcomes
//! 3. **Collect**: outcomes are gathered as they arrive
//! 4. **Resolve**: the resolver runs once at the graceful deadline, on every arrival after it, and
//!    when all endpoints have reported
//!
//! ## Behaviors
//!
//! - **Fast path**: quorum reached early, stragglers are abandoned
//! - **Slow path**: quorum unmet at the graceful deadline, collection continues until it is
//!   reached or the total deadline makes the stragglers fail
//! - **Failure path**: every endpoint reported and still no quorum, the aggregated error is
//!   returned
//!
//! # Module Organization
//!
//! - [`config`]: timeouts and quorum parameters (`ConsensusConfig`)
//! - [`types`]: per-endpoint `Outcome`
//! - [`engine`]: fan-out / fan-in (`Dispatcher`)
//! - [`quorum`]: resolution strategies (majority, median, block number)
//! - [`compare`]: structural equality used by majority voting
//! - [`errors`]: error aggregation (`ErrorList`, `ConsensusError`)

pub mod compare;
pub mod config;
pub mod engine;
pub mod errors;
pub mod quorum;
pub mod types;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;

pub use config::{default_min_responses, ConsensusConfig};
pub use engine::{trim_trailing_nulls, Dispatcher};
pub use errors::{ConsensusError, ErrorList, DIFFERENT_RESPONSES, NOT_ENOUGH_RESPONSES};
pub use quorum::{BlockNumberResolver, MajorityResolver, MedianResolver, Quantity, Resolver};
pub use types::Outcome;
