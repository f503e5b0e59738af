//! Persisted state tree: modules → resources → instances.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_core::{
    AbsProviderConfig, AbsResourceInstance, InstanceKey, ModuleInstance, ResourceMode,
};

use crate::error::StateError;
use crate::instance::InstanceState;

/// Everything under management.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Incremented on every write.
    pub serial: u64,
    /// Module states; at most one per module path.
    #[serde(default)]
    pub modules: Vec<ModuleState>,
}

/// Resources of one module instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleState {
    /// Module path.
    pub path: ModuleInstance,
    /// Resources keyed by legacy state key.
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceState>,
}

/// One resource instance record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Managed or data.
    pub mode: ResourceMode,
    /// Resource type the object was stored as.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Resource name.
    pub name: String,
    /// Instance key.
    #[serde(default)]
    pub key: InstanceKey,
    /// Provider configuration responsible for the object.
    pub provider: AbsProviderConfig,
    /// Current object, if any.
    pub primary: Option<InstanceState>,
}

impl ResourceState {
    /// Record for `addr` holding `primary`.
    #[must_use]
    pub fn for_instance(
        addr: &AbsResourceInstance,
        provider: AbsProviderConfig,
        primary: InstanceState,
    ) -> Self {
        Self {
            mode: addr.resource.resource.mode,
            type_name: addr.type_name().to_owned(),
            name: addr.name().to_owned(),
            key: addr.resource.key.clone(),
            provider,
            primary: Some(primary),
        }
    }
}

impl ModuleState {
    /// Empty module state.
    #[must_use]
    pub fn new(path: ModuleInstance) -> Self {
        Self {
            path,
            resources: BTreeMap::new(),
        }
    }
}

impl State {
    /// Empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Module state for `path`, if present.
    #[must_use]
    pub fn module(&self, path: &ModuleInstance) -> Option<&ModuleState> {
        self.modules.iter().find(|m| &m.path == path)
    }

    /// Module state for `path`, created if missing.
    pub fn ensure_module(&mut self, path: &ModuleInstance) -> &mut ModuleState {
        let idx = match self.modules.iter().position(|m| &m.path == path) {
            Some(idx) => idx,
            None => {
                self.modules.push(ModuleState::new(path.clone()));
                self.modules.len() - 1
            }
        };
        &mut self.modules[idx]
    }

    /// Store `record` under `key` in the module at `path`, replacing any
    /// previous record with that key.
    pub fn put(&mut self, path: &ModuleInstance, key: impl Into<String>, record: ResourceState) {
        let key = key.into();
        tracing::debug!(module = %path, key = %key, "writing resource state");
        self.ensure_module(path).resources.insert(key, record);
        self.serial += 1;
    }

    /// The stored object for `addr`, looked up by its legacy state key.
    #[must_use]
    pub fn instance(&self, addr: &AbsResourceInstance) -> Option<&InstanceState> {
        self.module(&addr.module)?
            .resources
            .get(&addr.legacy_state_key())?
            .primary
            .as_ref()
    }

    /// Total number of resource records across all modules.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.modules.iter().map(|m| m.resources.len()).sum()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, StateError> {
        Ok(serde_json::from_str(json)?)
    }
}
