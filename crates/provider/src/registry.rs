//! Provider registry keyed by provider configuration address.

use std::sync::Arc;

use dashmap::DashMap;
use strata_core::AbsProviderConfig;

use crate::error::ProviderError;
use crate::provider::ResourceProvider;

/// Thread-safe registry of configured provider instances.
///
/// One entry per provider configuration (`provider.acme`,
/// `module.net.provider.acme.west`, ...). Nodes look providers up here at
/// evaluation time.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: DashMap<AbsProviderConfig, Arc<dyn ResourceProvider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a configured provider.
    ///
    /// If a provider with the same address already exists, it is replaced.
    pub fn register(&self, addr: AbsProviderConfig, provider: Arc<dyn ResourceProvider>) {
        tracing::info!(provider = %addr, name = provider.name(), "registered provider");
        self.providers.insert(addr, provider);
    }

    /// Look up the provider configured at `addr`.
    pub fn get(
        &self,
        addr: &AbsProviderConfig,
    ) -> Result<Arc<dyn ResourceProvider>, ProviderError> {
        self.providers
            .get(addr)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ProviderError::NotFound { addr: addr.clone() })
    }

    /// Whether a provider is configured at `addr`.
    #[must_use]
    pub fn contains(&self, addr: &AbsProviderConfig) -> bool {
        self.providers.contains_key(addr)
    }

    /// Number of configured providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// All configured addresses, sorted.
    #[must_use]
    pub fn addresses(&self) -> Vec<AbsProviderConfig> {
        let mut addrs: Vec<_> = self.providers.iter().map(|e| e.key().clone()).collect();
        addrs.sort();
        addrs
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.addresses())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockProvider;
    use pretty_assertions::assert_eq;

    #[test]
    fn register_and_get() {
        let registry = ProviderRegistry::new();
        let addr = AbsProviderConfig::root("acme");
        registry.register(addr.clone(), Arc::new(MockProvider::new("acme")));

        assert!(registry.contains(&addr));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&addr).unwrap().name(), "acme");
    }

    #[test]
    fn missing_provider_is_not_found() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        let err = registry.get(&AbsProviderConfig::root("acme")).err().unwrap();
        assert!(matches!(err, ProviderError::NotFound { .. }));
    }

    #[test]
    fn register_replaces_existing() {
        let registry = ProviderRegistry::new();
        let addr = AbsProviderConfig::root("acme");
        registry.register(addr.clone(), Arc::new(MockProvider::new("first")));
        registry.register(addr.clone(), Arc::new(MockProvider::new("second")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&addr).unwrap().name(), "second");
    }

    #[test]
    fn aliases_are_distinct_entries() {
        let registry = ProviderRegistry::new();
        registry.register(AbsProviderConfig::root("acme"), Arc::new(MockProvider::new("a")));
        registry.register(
            AbsProviderConfig::root("acme").with_alias("west"),
            Arc::new(MockProvider::new("b")),
        );
        let names: Vec<String> = registry.addresses().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["provider.acme", "provider.acme.west"]);
    }
}
