//! Import targets and the transformer that turns them into graph nodes.

use strata_core::{AbsProviderConfig, AbsResourceInstance};
use strata_engine::{EngineError, Graph, GraphTransformer};

use crate::node::ImportStateNode;

/// A request to bring one existing remote object under management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTarget {
    /// Address to import into.
    pub addr: AbsResourceInstance,
    /// Remote ID to import.
    pub id: String,
    /// Provider configuration to import with.
    pub provider_addr: AbsProviderConfig,
}

impl ImportTarget {
    /// Target using the provider implied by the resource type.
    #[must_use]
    pub fn new(addr: AbsResourceInstance, id: impl Into<String>) -> Self {
        let provider_addr = addr.default_provider_config();
        Self {
            addr,
            id: id.into(),
            provider_addr,
        }
    }

    /// Same target with an explicit provider configuration.
    #[must_use]
    pub fn with_provider(mut self, provider_addr: AbsProviderConfig) -> Self {
        self.provider_addr = provider_addr;
        self
    }
}

/// Adds one [`ImportStateNode`] per target, without edges.
#[derive(Debug, Clone, Default)]
pub struct ImportStateTransformer {
    targets: Vec<ImportTarget>,
}

impl ImportStateTransformer {
    /// Transformer over `targets`.
    #[must_use]
    pub fn new(targets: Vec<ImportTarget>) -> Self {
        Self { targets }
    }

    /// The targets this transformer adds.
    #[must_use]
    pub fn targets(&self) -> &[ImportTarget] {
        &self.targets
    }
}

impl GraphTransformer for ImportStateTransformer {
    fn transform(&self, graph: &mut Graph) -> Result<(), EngineError> {
        for target in &self.targets {
            tracing::info!(
                addr = %target.addr,
                id = %target.id,
                provider = %target.provider_addr,
                "adding import node"
            );
            graph.add(ImportStateNode::new(target));
        }
        Ok(())
    }
}
