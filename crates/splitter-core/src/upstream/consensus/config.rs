//! Dispatch and resolver configuration.

use super::errors::ConsensusError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration shared by the dispatcher and the resolvers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Hard cutoff for one inbound call, including tag resolution (default: 10s)
    #[serde(default = "default_total_timeout_ms")]
    pub total_timeout_ms: u64,

    /// Point at which resolution is first attempted without waiting for every endpoint
    /// (default: 1s)
    #[serde(default = "default_graceful_timeout_ms")]
    pub graceful_timeout_ms: u64,

    /// Quorum threshold. When unset, derived from the endpoint count with
    /// [`default_min_responses`].
    #[serde(default)]
    pub min_responses: Option<usize>,

    /// How far behind the highest reported block an answer to `eth_blockNumber` may be
    /// (default: 10)
    #[serde(default = "default_max_blocks_behind")]
    pub max_blocks_behind: u64,
}

fn default_total_timeout_ms() -> u64 {
    10_000
}

fn default_graceful_timeout_ms() -> u64 {
    1_000
}

fn default_max_blocks_behind() -> u64 {
    10
}

/// Quorum used when none is configured: every endpoint for one or zero endpoints, otherwise all
/// but one.
#[must_use]
pub fn default_min_responses(endpoints: usize) -> usize {
    if endpoints < 2 {
        endpoints
    } else {
        endpoints - 1
    }
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            total_timeout_ms: default_total_timeout_ms(),
            graceful_timeout_ms: default_graceful_timeout_ms(),
            min_responses: None,
            max_blocks_behind: default_max_blocks_behind(),
        }
    }
}

impl ConsensusConfig {
    #[must_use]
    pub fn total_timeout(&self) -> Duration {
        Duration::from_millis(self.total_timeout_ms)
    }

    #[must_use]
    pub fn graceful_timeout(&self) -> Duration {
        Duration::from_millis(self.graceful_timeout_ms)
    }

    /// Returns the effective quorum threshold for `endpoints` configured endpoints.
    #[must_use]
    pub fn min_responses_for(&self, endpoints: usize) -> usize {
        self.min_responses.unwrap_or_else(|| default_min_responses(endpoints))
    }

    /// Checks the configuration against the number of configured endpoints.
    ///
    /// # Errors
    ///
    /// - [`ConsensusError::NoEndpoints`] if `endpoints` is zero
    /// - [`ConsensusError::InvalidMinResponses`] if the quorum is zero or exceeds `endpoints`
    /// - [`ConsensusError::InvalidTimeout`] if a timeout is zero
    pub fn validate(&self, endpoints: usize) -> Result<(), ConsensusError> {
        if endpoints == 0 {
            return Err(ConsensusError::NoEndpoints);
        }

        let min_responses = self.min_responses_for(endpoints);
        if min_responses == 0 || min_responses > endpoints {
            return Err(ConsensusError::InvalidMinResponses { min_responses, endpoints });
        }

        if self.total_timeout_ms == 0 {
            return Err(ConsensusError::InvalidTimeout("total"));
        }

        if self.graceful_timeout_ms == 0 {
            return Err(ConsensusError::InvalidTimeout("graceful"));
        }

        Ok(())
    }
}
