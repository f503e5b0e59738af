//! Import error types.

use std::path::PathBuf;

use strata_core::{AbsResourceInstance, DiagnosticsError};
use strata_engine::{EngineError, EvalError};
use thiserror::Error;

/// Errors raised while importing.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The node was evaluated before a provider-resolution pass ran.
    #[error("no provider has been resolved for {addr}")]
    ProviderNotResolved {
        /// Address being imported.
        addr: AbsResourceInstance,
    },

    /// Expansion was requested before a successful evaluation.
    #[error("{addr} (import id {id:?}) must be evaluated before it can be expanded")]
    NotEvaluated {
        /// Address being imported.
        addr: AbsResourceInstance,
        /// Requested remote ID.
        id: String,
    },

    /// The provider returned an object without a resource type.
    #[error("import of {addr} didn't set type for {id:?}; this is a bug in the provider")]
    MissingType {
        /// Resolved target address.
        addr: AbsResourceInstance,
        /// Remote ID of the untyped object.
        id: String,
    },

    /// The refreshed object does not match the requested one.
    #[error("cannot import {addr} with id {id:?}: {reason}")]
    VerifyFailed {
        /// Resolved target address.
        addr: AbsResourceInstance,
        /// Remote ID that was requested.
        id: String,
        /// What did not match.
        reason: String,
    },

    /// One or more target addresses are already in state.
    #[error(transparent)]
    Conflicts(DiagnosticsError),

    /// Building or walking the import graph failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// At least one node failed or was skipped.
    #[error("import failed: {}", .failures.join("; "))]
    NodesFailed {
        /// `<node>: <error>` for every failed node, then `<node>: skipped`
        /// for every skipped one.
        failures: Vec<String>,
    },

    /// Import configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<ImportError> for EvalError {
    fn from(err: ImportError) -> Self {
        Self::node(err)
    }
}

/// Errors from loading an [`ImportConfig`](crate::ImportConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for this schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A target's address does not parse.
    #[error("target {index}: invalid address {address:?}: {source}")]
    InvalidAddress {
        /// Position of the target in the file, from zero.
        index: usize,
        /// The address as written.
        address: String,
        /// Why it does not parse.
        #[source]
        source: strata_core::AddressError,
    },

    /// A target's provider does not parse.
    #[error("target {index}: invalid provider {provider:?}: {source}")]
    InvalidProvider {
        /// Position of the target in the file, from zero.
        index: usize,
        /// The provider address as written.
        provider: String,
        /// Why it does not parse.
        #[source]
        source: strata_core::AddressError,
    },

    /// A value is out of range.
    #[error("invalid configuration: {message}")]
    Validation {
        /// What is wrong.
        message: String,
    },
}
