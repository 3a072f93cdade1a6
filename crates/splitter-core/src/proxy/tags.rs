//! Block tag normalization.
//!
//! Endpoints interpret `"latest"` independently, so the same call could be answered for
//! different heights and never reach a majority. Before such a call is dispatched the tag is
//! replaced by one concrete number obtained from a nested `eth_blockNumber` dispatch resolved
//! with [`BlockNumberResolver`].
//!
//! | Input                           | Result                          |
//! |---------------------------------|---------------------------------|
//! | number                          | unchanged                       |
//! | `latest`, `pending`             | resolved current block number   |
//! | `earliest`, `safe`, `finalized` | [`ProxyError::UnsupportedTag`]  |
//! | anything, single endpoint       | unchanged                       |

use super::errors::ProxyError;
use crate::{
    upstream::consensus::{BlockNumberResolver, Dispatcher},
    utils::{BlockParameter, BlockTag},
};
use alloy_primitives::U64;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::debug;

/// Replaces symbolic block tags with concrete block numbers.
pub struct TagResolver {
    dispatcher: Arc<Dispatcher>,
    resolver: BlockNumberResolver,
}

impl TagResolver {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, resolver: BlockNumberResolver) -> Self {
        Self { dispatcher, resolver }
    }

    /// Starts a normalization session bound to one inbound call's `deadline`.
    ///
    /// The tip is fetched at most once per session, so every parameter of one call is pinned to
    /// the same height.
    #[must_use]
    pub fn session(&self, deadline: Instant) -> TagSession<'_> {
        TagSession { tags: self, deadline, tip: None }
    }
}

/// Normalization state for a single inbound call.
pub struct TagSession<'a> {
    tags: &'a TagResolver,
    deadline: Instant,
    tip: Option<u64>,
}

impl TagSession<'_> {
    /// Normalizes `block`.
    ///
    /// # Errors
    ///
    /// - [`ProxyError::UnsupportedTag`] for `earliest`, `safe` and `finalized`
    /// - [`ProxyError::Consensus`] if the current block number cannot be resolved
    pub async fn normalize(&mut self, block: BlockParameter) -> Result<BlockParameter, ProxyError> {
        if self.tags.dispatcher.endpoint_count() < 2 {
            return Ok(block);
        }

        match block {
            BlockParameter::Number(_) => Ok(block),
            BlockParameter::Tag(BlockTag::Latest | BlockTag::Pending) => {
                let tip = self.tip().await?;
                debug!(tag = %block, block_number = tip, "normalized block tag");
                Ok(BlockParameter::Number(tip))
            }
            BlockParameter::Tag(tag) => Err(ProxyError::UnsupportedTag(tag)),
        }
    }

    /// Normalizes `block` if present.
    ///
    /// # Errors
    ///
    /// See [`normalize`](Self::normalize).
    pub async fn normalize_opt(
        &mut self,
        block: Option<BlockParameter>,
    ) -> Result<Option<BlockParameter>, ProxyError> {
        match block {
            Some(block) => self.normalize(block).await.map(Some),
            None => Ok(None),
        }
    }

    async fn tip(&mut self) -> Result<u64, ProxyError> {
        if let Some(tip) = self.tip {
            return Ok(tip);
        }

        let number: U64 = self
            .tags
            .dispatcher
            .dispatch_with_deadline(self.deadline, &self.tags.resolver, "eth_blockNumber", vec![])
            .await?;
        let tip = number.to::<u64>();
        self.tip = Some(tip);
        Ok(tip)
    }
}
