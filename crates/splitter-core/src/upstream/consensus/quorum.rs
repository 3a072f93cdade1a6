//! Resolution strategies turning per-endpoint outcomes into one answer.
//!
//! All resolvers are stateless apart from their thresholds and their decisions do not depend on
//! the order in which outcomes arrived.
//!
//! # Strategies
//!
//! - [`MajorityResolver`]: exact-match quorum for hashes, objects and counts
//! - [`MedianResolver`]: robust median for gas values that legitimately differ between nodes
//! - [`BlockNumberResolver`]: lowest block number that is not too far behind the highest one
//!
//! On failure the resolver's own message comes first, followed by the unique endpoint errors.

use super::{
    compare::{project, values_equal},
    errors::{ErrorList, DIFFERENT_RESPONSES, NOT_ENOUGH_RESPONSES},
    types::Outcome,
};
use alloy_primitives::{U256, U64};
use serde::Serialize;

/// Turns a set of outcomes into one authoritative value.
pub trait Resolver<T>: Send + Sync {
    /// # Errors
    ///
    /// Returns the aggregated error when no value can be committed to.
    fn resolve(&self, outcomes: &[Outcome<T>]) -> Result<T, ErrorList>;
}

/// Numeric quantities the median and block number resolvers can operate on.
pub trait Quantity: Ord + Clone + Send + Sync {
    /// `⌊(self + other) / 2⌋` without overflow.
    #[must_use]
    fn midpoint(&self, other: &Self) -> Self;

    /// `self - other`, saturating at zero.
    #[must_use]
    fn saturating_minus(&self, other: u64) -> Self;
}

impl Quantity for u64 {
    fn midpoint(&self, other: &Self) -> Self {
        self / 2 + other / 2 + (self & other & 1)
    }

    fn saturating_minus(&self, other: u64) -> Self {
        self.saturating_sub(other)
    }
}

macro_rules! impl_quantity_for_uint {
    ($($ty:ty),*) => {$(
        impl Quantity for $ty {
            fn midpoint(&self, other: &Self) -> Self {
                let carry = <$ty>::from(u8::from(self.bit(0) && other.bit(0)));
                (*self >> 1usize) + (*other >> 1usize) + carry
            }

            fn saturating_minus(&self, other: u64) -> Self {
                self.saturating_sub(<$ty>::from(other))
            }
        }
    )*};
}

impl_quantity_for_uint!(U64, U256);

fn collect_errors<T>(outcomes: &[Outcome<T>], first: &str) -> ErrorList {
    let mut errors = ErrorList::from_message(first);
    errors.extend(outcomes.iter().filter_map(Outcome::error));
    errors
}

fn successful<T>(outcomes: &[Outcome<T>]) -> impl Iterator<Item = &T> {
    outcomes.iter().filter_map(Outcome::value)
}

/// Returns the most common value if it was reported at least `min_responses` times and no other
/// value was reported equally often.
#[derive(Debug, Clone, Copy)]
pub struct MajorityResolver {
    min_responses: usize,
}

impl MajorityResolver {
    #[must_use]
    pub fn new(min_responses: usize) -> Self {
        Self { min_responses }
    }
}

impl<T: Serialize + Clone + Send + Sync> Resolver<T> for MajorityResolver {
    fn resolve(&self, outcomes: &[Outcome<T>]) -> Result<T, ErrorList> {
        let values: Vec<&T> = successful(outcomes).collect();
        if values.len() < self.min_responses {
            return Err(collect_errors(outcomes, NOT_ENOUGH_RESPONSES));
        }

        // (representative index, projected form, count)
        let mut classes: Vec<(usize, Option<serde_json::Value>, usize)> = Vec::new();
        for (index, value) in values.iter().enumerate() {
            let projected = project(*value);
            let existing = classes.iter_mut().find(|(_, class, _)| match (class, &projected) {
                (Some(class), Some(projected)) => values_equal(class, projected),
                _ => false,
            });
            match existing {
                Some((_, _, count)) => *count += 1,
                None => classes.push((index, projected, 1)),
            }
        }

        classes.sort_by(|a, b| b.2.cmp(&a.2));
        let top = classes.first().map_or(0, |c| c.2);
        let second = classes.get(1).map_or(0, |c| c.2);

        if top == 0 || top < self.min_responses || top == second {
            return Err(collect_errors(outcomes, DIFFERENT_RESPONSES));
        }

        Ok(values[classes[0].0].clone())
    }
}

/// Returns the median of all reported values, averaging (rounding down) the middle pair when
/// there is an even number of them.
#[derive(Debug, Clone, Copy)]
pub struct MedianResolver {
    min_responses: usize,
}

impl MedianResolver {
    #[must_use]
    pub fn new(min_responses: usize) -> Self {
        Self { min_responses }
    }
}

impl<T: Quantity> Resolver<T> for MedianResolver {
    fn resolve(&self, outcomes: &[Outcome<T>]) -> Result<T, ErrorList> {
        let mut values: Vec<&T> = successful(outcomes).collect();
        if values.is_empty() || values.len() < self.min_responses {
            return Err(collect_errors(outcomes, NOT_ENOUGH_RESPONSES));
        }

        values.sort_unstable();
        let mid = values.len() / 2;
        if values.len() % 2 == 1 {
            Ok(values[mid].clone())
        } else {
            Ok(values[mid - 1].midpoint(values[mid]))
        }
    }
}

/// Returns the lowest reported block number that is at most `max_blocks_behind` below the
/// highest reported one.
///
/// Nodes that lag slightly are tolerated, while a node reporting a block far in the past cannot
/// drag the answer down.
#[derive(Debug, Clone, Copy)]
pub struct BlockNumberResolver {
    min_responses: usize,
    max_blocks_behind: u64,
}

impl BlockNumberResolver {
    #[must_use]
    pub fn new(min_responses: usize, max_blocks_behind: u64) -> Self {
        Self { min_responses, max_blocks_behind }
    }
}

impl<T: Quantity> Resolver<T> for BlockNumberResolver {
    fn resolve(&self, outcomes: &[Outcome<T>]) -> Result<T, ErrorList> {
        let values: Vec<&T> = successful(outcomes).collect();
        let Some(max) = values.iter().copied().max() else {
            return Err(collect_errors(outcomes, NOT_ENOUGH_RESPONSES));
        };
        if values.len() < self.min_responses {
            return Err(collect_errors(outcomes, NOT_ENOUGH_RESPONSES));
        }

        let threshold = max.saturating_minus(self.max_blocks_behind);
        let lowest = values.iter().copied().filter(|v| **v >= threshold).min().unwrap_or(max);

        Ok(lowest.clone())
    }
}
