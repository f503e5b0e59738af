//! Top-level import operation.

use std::sync::Arc;

use strata_engine::{
    BuiltinEvalContext, EvalError, Graph, GraphTransformer, NodeFailure, ProviderTransformer,
    RootTransformer, WalkReport, Walker, WalkerConfig,
};
use strata_provider::ProviderRegistry;
use strata_state::StateStore;

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::transform::{ImportStateTransformer, ImportTarget};

/// Imports targets into a state store using a set of configured providers.
///
/// Builds the import graph (one import node per target, provider resolution,
/// single root), then walks it. Import nodes expand into per-object sub
/// nodes during the walk.
#[derive(Debug, Clone)]
pub struct Importer {
    config: WalkerConfig,
    providers: Arc<ProviderRegistry>,
    state: StateStore,
}

impl Importer {
    /// Importer writing to `state`.
    #[must_use]
    pub fn new(config: WalkerConfig, providers: Arc<ProviderRegistry>, state: StateStore) -> Self {
        Self {
            config,
            providers,
            state,
        }
    }

    /// Importer using the walker settings of `config`.
    #[must_use]
    pub fn from_config(
        config: &ImportConfig,
        providers: Arc<ProviderRegistry>,
        state: StateStore,
    ) -> Self {
        Self::new(config.walker_config(), providers, state)
    }

    /// The state store imports are written to.
    #[must_use]
    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Build the import graph for `targets` without walking it.
    pub fn graph(&self, targets: Vec<ImportTarget>) -> Result<Graph, ImportError> {
        let mut graph = Graph::new();
        ImportStateTransformer::new(targets).transform(&mut graph)?;
        ProviderTransformer::new(&self.providers).transform(&mut graph)?;
        RootTransformer.transform(&mut graph)?;
        Ok(graph)
    }

    /// Import every target.
    ///
    /// Fails only if the graph cannot be built (e.g. a target's provider is
    /// not configured) or scheduled. Failures of individual nodes are in the
    /// report; use [`ImportReport::into_result`] to treat them as an error.
    pub fn import(&self, targets: Vec<ImportTarget>) -> Result<ImportReport, ImportError> {
        let span = tracing::info_span!("import", targets = targets.len());
        let _guard = span.enter();

        let mut graph = self.graph(targets)?;
        let ctx = BuiltinEvalContext::new(Arc::clone(&self.providers), self.state.clone());
        let walk = Walker::new(&ctx, self.config).walk(&mut graph)?;

        tracing::info!(
            completed = walk.completed.len(),
            failed = walk.failures.len(),
            skipped = walk.skipped.len(),
            "import finished"
        );
        Ok(ImportReport { walk })
    }

    /// Import the targets listed in `config`.
    pub fn import_configured(&self, config: &ImportConfig) -> Result<ImportReport, ImportError> {
        self.import(config.targets()?)
    }
}

/// What an import run did.
#[derive(Debug, Default)]
pub struct ImportReport {
    walk: WalkReport,
}

impl ImportReport {
    /// Names of every import node and sub node that completed, in graph
    /// order. The synthetic root of an expanded subgraph is not listed.
    #[must_use]
    pub fn completed(&self) -> &[String] {
        &self.walk.completed
    }

    /// Nodes that failed.
    #[must_use]
    pub fn failures(&self) -> &[NodeFailure] {
        &self.walk.failures
    }

    /// Nodes that were not run because a dependency failed.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.walk.skipped
    }

    /// The failure recorded for `node`, if any.
    #[must_use]
    pub fn failure(&self, node: &str) -> Option<&EvalError> {
        self.walk.failure(node)
    }

    /// `true` when every node completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.walk.is_success()
    }

    /// The underlying walk report.
    #[must_use]
    pub fn into_walk_report(self) -> WalkReport {
        self.walk
    }

    /// `Ok(self)` when every node completed, otherwise
    /// [`ImportError::NodesFailed`] listing each failed and skipped node.
    pub fn into_result(self) -> Result<Self, ImportError> {
        if self.is_success() {
            return Ok(self);
        }
        let failures = self
            .walk
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.node, f.error))
            .chain(self.walk.skipped.iter().map(|name| format!("{name}: skipped")))
            .collect();
        Err(ImportError::NodesFailed { failures })
    }
}
