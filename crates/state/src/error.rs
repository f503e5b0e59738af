//! State errors.

use strata_core::AddressError;
use thiserror::Error;

/// Errors from querying or (de)serializing state.
#[derive(Debug, Error)]
pub enum StateError {
    /// A filter pattern is not a valid address.
    #[error("invalid state filter pattern {pattern:?}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why it did not parse.
        #[source]
        source: AddressError,
    },

    /// A serialization or deserialization error.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
