//! What a node can reach while it is being evaluated.

use std::sync::Arc;

use strata_core::AbsProviderConfig;
use strata_provider::{ProviderError, ProviderRegistry, ResourceProvider};
use strata_state::StateStore;

/// Services available to nodes during a walk.
///
/// Shared across the walker's threads, so implementations must be `Sync`.
pub trait EvalContext: Send + Sync {
    /// The configured provider at `addr`.
    fn provider(
        &self,
        addr: &AbsProviderConfig,
    ) -> Result<Arc<dyn ResourceProvider>, ProviderError>;

    /// The shared state store.
    fn state(&self) -> &StateStore;
}

/// [`EvalContext`] backed by a [`ProviderRegistry`] and a [`StateStore`].
#[derive(Debug, Clone)]
pub struct BuiltinEvalContext {
    providers: Arc<ProviderRegistry>,
    state: StateStore,
}

impl BuiltinEvalContext {
    /// Context over the given providers and state.
    #[must_use]
    pub fn new(providers: Arc<ProviderRegistry>, state: StateStore) -> Self {
        Self { providers, state }
    }

    /// The provider registry.
    #[must_use]
    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }
}

impl EvalContext for BuiltinEvalContext {
    fn provider(
        &self,
        addr: &AbsProviderConfig,
    ) -> Result<Arc<dyn ResourceProvider>, ProviderError> {
        self.providers.get(addr)
    }

    fn state(&self) -> &StateStore {
        &self.state
    }
}
