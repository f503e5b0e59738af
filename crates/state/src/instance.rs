//! State of a single remote object.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Provider-reported state of one remote object.
///
/// Cloning is a deep copy; nodes that mutate a state while refreshing work
/// on their own clone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceState {
    /// Remote identifier. Empty means "no object".
    pub id: String,
    /// Provider-defined attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,
    /// Provider-private metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, serde_json::Value>,
    /// Data that only lives for the duration of one run.
    #[serde(skip)]
    pub ephemeral: EphemeralState,
}

/// Run-scoped data attached to an [`InstanceState`]. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EphemeralState {
    /// Concrete resource type reported by an import. May refine the type of
    /// the address the import was requested for.
    pub type_name: String,
}

impl InstanceState {
    /// State with the given remote ID and nothing else.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the ephemeral resource type.
    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.ephemeral.type_name = type_name.into();
        self
    }

    /// Set one attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Whether this state describes no remote object.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}
