//! Block parameter parsing and encoding.
//!
//! A block parameter is either a concrete block number or a symbolic tag. Numbers are encoded as
//! `0x`-prefixed hex quantities on the wire; decimal strings are accepted on input.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Error types for block parameter parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

/// Standard Ethereum block tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockTag {
    /// The most recent block in the canonical chain
    Latest,
    /// The earliest/genesis block
    Earliest,
    /// A block in the pending state
    Pending,
    /// The most recent safe head block
    Safe,
    /// The most recent finalized block
    Finalized,
}

impl BlockTag {
    /// Returns the wire name of the tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Earliest => "earliest",
            Self::Pending => "pending",
            Self::Safe => "safe",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A block reference as accepted by block-scoped JSON-RPC methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockParameter {
    /// Specific block number
    Number(u64),
    /// Block tag (latest, earliest, etc.)
    Tag(BlockTag),
}

impl BlockParameter {
    /// Parse a block parameter from a string (JSON-RPC request parameter).
    ///
    /// Handles:
    /// - Hex strings with "0x" prefix (e.g., "0x123")
    /// - Decimal strings (e.g., "123")
    /// - Block tags (e.g., "latest", "earliest", "safe", "finalized", "pending")
    ///
    /// # Examples
    /// ```
    /// use splitter_core::utils::block_param::{BlockParameter, BlockTag};
    ///
    /// assert_eq!(BlockParameter::parse("latest").unwrap(), BlockParameter::Tag(BlockTag::Latest));
    /// assert_eq!(BlockParameter::parse("0x10").unwrap(), BlockParameter::Number(16));
    /// assert_eq!(BlockParameter::parse("100").unwrap(), BlockParameter::Number(100));
    /// ```
    ///
    /// # Errors
    /// Returns `ParseError` if the input is not a valid block parameter.
    pub fn parse(param: &str) -> Result<Self, ParseError> {
        match param.trim() {
            "latest" => Ok(Self::Tag(BlockTag::Latest)),
            "pending" => Ok(Self::Tag(BlockTag::Pending)),
            "earliest" => Ok(Self::Tag(BlockTag::Earliest)),
            "safe" => Ok(Self::Tag(BlockTag::Safe)),
            "finalized" => Ok(Self::Tag(BlockTag::Finalized)),
            s => {
                if let Some(hex_str) = s.strip_prefix("0x") {
                    u64::from_str_radix(hex_str, 16)
                        .map(Self::Number)
                        .map_err(|_| ParseError::InvalidHex(s.to_string()))
                } else {
                    s.parse::<u64>()
                        .map(Self::Number)
                        .map_err(|_| ParseError::InvalidNumber(s.to_string()))
                }
            }
        }
    }

    /// Returns the tag if this parameter is symbolic.
    #[must_use]
    pub fn tag(&self) -> Option<BlockTag> {
        match self {
            Self::Tag(tag) => Some(*tag),
            Self::Number(_) => None,
        }
    }

    /// Returns `true` if this parameter is a tag rather than a concrete number.
    #[must_use]
    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag(_))
    }
}

impl Default for BlockParameter {
    fn default() -> Self {
        Self::Tag(BlockTag::Latest)
    }
}

impl From<u64> for BlockParameter {
    fn from(number: u64) -> Self {
        Self::Number(number)
    }
}

impl From<BlockTag> for BlockParameter {
    fn from(tag: BlockTag) -> Self {
        Self::Tag(tag)
    }
}

impl FromStr for BlockParameter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BlockParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "0x{n:x}"),
            Self::Tag(tag) => tag.fmt(f),
        }
    }
}

impl Serialize for BlockParameter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlockParameter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BlockParameterVisitor;

        impl de::Visitor<'_> for BlockParameterVisitor {
            type Value = BlockParameter;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a block number or tag")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                BlockParameter::parse(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(BlockParameter::Number(v))
            }
        }

        deserializer.deserialize_any(BlockParameterVisitor)
    }
}
