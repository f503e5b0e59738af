//! Engine error types.

use strata_core::DiagnosticsError;
use strata_provider::ProviderError;
use thiserror::Error;

/// Errors from building, transforming, or walking a graph.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The graph contains a cycle and cannot be scheduled.
    #[error("cycle detected in graph")]
    CycleDetected,

    /// A transformer reported one or more problems.
    #[error(transparent)]
    Diagnostics(#[from] DiagnosticsError),
}

/// Fatal error from evaluating or expanding a single node.
///
/// Stops the node it came from; sibling nodes keep running.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A provider lookup or provider call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A step of a step sequence failed.
    #[error("{step}: {source}")]
    Step {
        /// Name of the failing step.
        step: String,
        /// What went wrong.
        #[source]
        source: Box<EvalError>,
    },

    /// Walking a dynamically expanded subgraph failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A node-specific error.
    #[error(transparent)]
    Node(Box<dyn std::error::Error + Send + Sync>),

    /// The node panicked.
    #[error("node panicked: {0}")]
    Panicked(String),
}

impl EvalError {
    /// Wrap a node-specific error.
    pub fn node(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Node(Box::new(err))
    }

    /// Name of the failing step, if this came out of a step sequence.
    #[must_use]
    pub fn step(&self) -> Option<&str> {
        match self {
            Self::Step { step, .. } => Some(step),
            _ => None,
        }
    }

    /// The underlying node-specific error, looking through step wrappers.
    #[must_use]
    pub fn downcast_ref<T: std::error::Error + 'static>(&self) -> Option<&T> {
        match self {
            Self::Node(err) => err.downcast_ref::<T>(),
            Self::Step { source, .. } => source.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// The underlying provider error, looking through step wrappers.
    #[must_use]
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(err) => Some(err),
            Self::Step { source, .. } => source.provider_error(),
            _ => None,
        }
    }
}
