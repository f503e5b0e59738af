//! Address parsing errors.

use thiserror::Error;

/// Errors produced when parsing a resource, module, or provider address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The input ended where more was expected.
    #[error("invalid address {input:?}: unexpected end of input")]
    UnexpectedEnd {
        /// The full input.
        input: String,
    },

    /// A character that does not fit the grammar at this position.
    #[error("invalid address {input:?}: unexpected character at offset {position}")]
    UnexpectedChar {
        /// The full input.
        input: String,
        /// Byte offset of the offending character.
        position: usize,
    },

    /// A required keyword is missing.
    #[error("invalid address {input:?}: expected {expected:?}")]
    Expected {
        /// The full input.
        input: String,
        /// The missing keyword.
        expected: &'static str,
    },

    /// A name starts with a digit or `-`.
    #[error("invalid address {input:?}: invalid name {name:?}")]
    InvalidName {
        /// The full input.
        input: String,
        /// The rejected name.
        name: String,
    },

    /// A bracketed key is neither an integer nor a quoted string.
    #[error("invalid address {input:?}: invalid instance key {key:?}")]
    InvalidKey {
        /// The full input.
        input: String,
        /// The rejected key text.
        key: String,
    },
}
