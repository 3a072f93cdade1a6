//! Error aggregation for dispatches that could not be resolved.

use std::fmt;
use thiserror::Error;

/// Returned when fewer non-error responses than required were collected.
pub const NOT_ENOUGH_RESPONSES: &str = "not enough responses from RPC servers";

/// Returned when the responses did not agree strongly enough.
pub const DIFFERENT_RESPONSES: &str = "RPC servers returned different responses";

/// Ordered list of unique error messages collected during one dispatch.
///
/// Adding a message that is already present, or an empty message, is a no-op.
///
/// # Example
///
/// ```
/// use splitter_core::upstream::consensus::ErrorList;
///
/// let mut errors = ErrorList::new();
/// assert_eq!(errors.to_string(), "unknown error");
///
/// errors.add("a");
/// errors.add("a");
/// assert_eq!(errors.to_string(), "a");
///
/// errors.add("b");
/// assert_eq!(errors.to_string(), "the following errors occurred: [a, b]");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList {
    messages: Vec<String>,
}

impl ErrorList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list holding a single message.
    #[must_use]
    pub fn from_message(message: impl fmt::Display) -> Self {
        let mut list = Self::new();
        list.add(message);
        list
    }

    /// Appends `error` unless a message with the same text is already present.
    pub fn add(&mut self, error: impl fmt::Display) {
        let message = error.to_string();
        if message.is_empty() || self.messages.iter().any(|m| *m == message) {
            return;
        }
        self.messages.push(message);
    }

    /// Appends every message of `other`, keeping uniqueness.
    pub fn merge(&mut self, other: ErrorList) {
        for message in other.messages {
            self.add(message);
        }
    }

    /// Builder-style [`add`](Self::add).
    #[must_use]
    pub fn with(mut self, error: impl fmt::Display) -> Self {
        self.add(error);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl<E: fmt::Display> Extend<E> for ErrorList {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for error in iter {
            self.add(error);
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.messages.as_slice() {
            [] => f.write_str("unknown error"),
            [only] => f.write_str(only),
            all => write!(f, "the following errors occurred: [{}]", all.join(", ")),
        }
    }
}

impl std::error::Error for ErrorList {}

/// Errors produced by the dispatcher and resolver setup.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConsensusError {
    /// No upstream endpoints were configured.
    #[error("no RPC endpoints configured")]
    NoEndpoints,

    /// The quorum threshold cannot be met by the configured endpoints.
    #[error("minimum responses must be between 1 and {endpoints}, got {min_responses}")]
    InvalidMinResponses { min_responses: usize, endpoints: usize },

    /// A timeout was configured as zero.
    #[error("{0} timeout must be greater than 0")]
    InvalidTimeout(&'static str),

    /// Every endpoint reported and the resolver still could not commit to an answer.
    #[error("{0}")]
    Unresolved(#[from] ErrorList),
}
