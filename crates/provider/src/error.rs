//! Provider errors.

use strata_core::{AbsProviderConfig, AbsResourceInstance};
use thiserror::Error;

/// Errors returned by providers and by provider lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// No provider is registered for the configuration address.
    #[error("provider configuration {addr} is not available")]
    NotFound {
        /// The requested configuration.
        addr: AbsProviderConfig,
    },

    /// The provider could not import the remote object.
    #[error("importing {addr} with id {id:?} failed: {reason}")]
    Import {
        /// Target address of the import.
        addr: AbsResourceInstance,
        /// Requested remote ID.
        id: String,
        /// Provider-specific reason.
        reason: String,
    },

    /// The provider could not read the current state of a remote object.
    #[error("refreshing {addr} failed: {reason}")]
    Refresh {
        /// Address being refreshed.
        addr: AbsResourceInstance,
        /// Provider-specific reason.
        reason: String,
    },
}
