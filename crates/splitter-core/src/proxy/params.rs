//! Positional JSON-RPC parameter decoding.

use super::errors::ProxyError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Positional parameters of one request.
///
/// A missing `params` member and an explicit `null` both mean "no parameters". A `null` in a
/// position counts as omitted.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: Vec<Value>,
}

impl Params {
    /// # Errors
    ///
    /// Returns [`ProxyError::InvalidParams`] if `params` is neither absent nor an array.
    pub fn parse(params: Option<Value>) -> Result<Self, ProxyError> {
        match params {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::Array(values)) => Ok(Self { values }),
            Some(_) => Err(ProxyError::InvalidParams("non-array args".to_string())),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Rejects calls carrying more than `max` parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::InvalidParams`] when there are too many arguments.
    pub fn ensure_at_most(&self, max: usize) -> Result<(), ProxyError> {
        if self.values.len() > max {
            return Err(ProxyError::InvalidParams(format!(
                "too many arguments, want at most {max}"
            )));
        }
        Ok(())
    }

    /// Decodes the parameter at `index`, which must be present.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::InvalidParams`] if the parameter is missing or malformed.
    pub fn required<T: DeserializeOwned>(&self, index: usize) -> Result<T, ProxyError> {
        self.optional(index)?.ok_or_else(|| {
            ProxyError::InvalidParams(format!("missing value for required argument {index}"))
        })
    }

    /// Decodes the parameter at `index` if it is present and not `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::InvalidParams`] if the parameter is malformed.
    pub fn optional<T: DeserializeOwned>(&self, index: usize) -> Result<Option<T>, ProxyError> {
        match self.values.get(index) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(|e| ProxyError::InvalidParams(format!("invalid argument {index}: {e}"))),
        }
    }
}
