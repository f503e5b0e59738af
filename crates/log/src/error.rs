//! Logging errors.

use thiserror::Error;

/// Errors from setting up logging.
#[derive(Debug, Error)]
pub enum LogError {
    /// Filter directives do not parse.
    #[error("invalid filter '{filter}': {reason}")]
    Filter {
        /// The directives as given.
        filter: String,
        /// Parser message.
        reason: String,
    },

    /// Unknown output format name.
    #[error("unknown log format '{0}', expected compact, pretty or json")]
    Format(String),

    /// A global subscriber is already installed.
    #[error("logger already initialized: {0}")]
    AlreadyInitialized(String),
}
