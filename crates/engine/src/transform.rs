//! Graph transformers: passes that add nodes and edges, or annotate nodes,
//! before a graph is walked.

use strata_core::{AbsProviderConfig, Diagnostics};
use strata_provider::ProviderRegistry;

use crate::capability::RootNode;
use crate::error::EngineError;
use crate::graph::Graph;

/// A single pass over a graph.
pub trait GraphTransformer {
    /// Mutate `graph` in place.
    fn transform(&self, graph: &mut Graph) -> Result<(), EngineError>;
}

/// Gives the graph a single entry point.
///
/// When the graph has exactly one root it is left alone. Otherwise a
/// [`RootNode`] is added with an edge to every existing root, so an empty
/// graph ends up with just the root node.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootTransformer;

impl GraphTransformer for RootTransformer {
    fn transform(&self, graph: &mut Graph) -> Result<(), EngineError> {
        let roots = graph.roots();
        if roots.len() == 1 {
            return Ok(());
        }
        let root = graph.add(RootNode);
        for idx in roots {
            graph.connect(root, idx);
        }
        Ok(())
    }
}

/// Resolves the provider configuration of every [`ProviderConsumer`] node.
///
/// A consumer gets the address it asked for when that address is registered.
/// Unless the request is exact, the search continues through the parent
/// modules up to the root. Every consumer that cannot be resolved is
/// reported, all at once.
///
/// [`ProviderConsumer`]: crate::capability::ProviderConsumer
#[derive(Debug, Clone, Copy)]
pub struct ProviderTransformer<'a> {
    providers: &'a ProviderRegistry,
}

impl<'a> ProviderTransformer<'a> {
    /// Transformer resolving against `providers`.
    #[must_use]
    pub fn new(providers: &'a ProviderRegistry) -> Self {
        Self { providers }
    }

    fn resolve(&self, wanted: &AbsProviderConfig, exact: bool) -> Option<AbsProviderConfig> {
        let mut candidate = wanted.clone();
        loop {
            if self.providers.contains(&candidate) {
                return Some(candidate);
            }
            if exact {
                return None;
            }
            candidate = candidate.inherited()?;
        }
    }
}

impl GraphTransformer for ProviderTransformer<'_> {
    fn transform(&self, graph: &mut Graph) -> Result<(), EngineError> {
        let mut diags = Diagnostics::new();

        for node in graph.nodes_mut() {
            let name = node.name();
            let Some(consumer) = node.as_provider_consumer() else {
                continue;
            };
            let (wanted, exact) = consumer.provided_by();
            match self.resolve(&wanted, exact) {
                Some(addr) => {
                    tracing::debug!(node = %name, provider = %addr, "resolved provider");
                    consumer.set_provider(addr);
                }
                None => diags.error(
                    "Provider configuration not present",
                    format!("{name} requires {wanted}, which is not configured"),
                ),
            }
        }

        diags.into_result()?;
        Ok(())
    }
}
