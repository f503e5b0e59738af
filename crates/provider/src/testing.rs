//! Scripted provider doubles.

use std::collections::HashMap;

use parking_lot::Mutex;
use strata_core::AbsResourceInstance;
use strata_state::InstanceState;

use crate::error::ProviderError;
use crate::provider::ResourceProvider;

/// A recorded provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    /// `import_state(addr, id)`.
    Import {
        /// Target address, rendered.
        addr: String,
        /// Requested ID.
        id: String,
    },
    /// `refresh(addr, state)`.
    Refresh {
        /// Address, rendered.
        addr: String,
        /// ID of the state passed in.
        id: String,
    },
}

/// Provider whose answers are scripted per remote ID.
///
/// Unscripted imports fail; unscripted refreshes echo the input state.
#[derive(Debug, Default)]
pub struct MockProvider {
    name: String,
    imports: HashMap<String, Result<Vec<InstanceState>, String>>,
    refreshes: HashMap<String, Result<Option<InstanceState>, String>>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl MockProvider {
    /// Provider with nothing scripted.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// `import_state(_, id)` returns `states`.
    #[must_use]
    pub fn with_import(mut self, id: impl Into<String>, states: Vec<InstanceState>) -> Self {
        self.imports.insert(id.into(), Ok(states));
        self
    }

    /// `import_state(_, id)` fails with `reason`.
    #[must_use]
    pub fn failing_import(mut self, id: impl Into<String>, reason: impl Into<String>) -> Self {
        self.imports.insert(id.into(), Err(reason.into()));
        self
    }

    /// `refresh` of a state with this ID returns `result`.
    #[must_use]
    pub fn with_refresh(mut self, id: impl Into<String>, result: Option<InstanceState>) -> Self {
        self.refreshes.insert(id.into(), Ok(result));
        self
    }

    /// `refresh` of a state with this ID fails with `reason`.
    #[must_use]
    pub fn failing_refresh(mut self, id: impl Into<String>, reason: impl Into<String>) -> Self {
        self.refreshes.insert(id.into(), Err(reason.into()));
        self
    }

    /// Every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().clone()
    }

    /// Number of `import_state` calls so far.
    #[must_use]
    pub fn import_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, ProviderCall::Import { .. }))
            .count()
    }

    /// Number of `refresh` calls so far.
    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, ProviderCall::Refresh { .. }))
            .count()
    }
}

impl ResourceProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn import_state(
        &self,
        addr: &AbsResourceInstance,
        id: &str,
    ) -> Result<Vec<InstanceState>, ProviderError> {
        self.calls.lock().push(ProviderCall::Import {
            addr: addr.to_string(),
            id: id.to_owned(),
        });
        match self.imports.get(id) {
            Some(Ok(states)) => Ok(states.clone()),
            Some(Err(reason)) => Err(ProviderError::Import {
                addr: addr.clone(),
                id: id.to_owned(),
                reason: reason.clone(),
            }),
            None => Err(ProviderError::Import {
                addr: addr.clone(),
                id: id.to_owned(),
                reason: "no such object".to_owned(),
            }),
        }
    }

    fn refresh(
        &self,
        addr: &AbsResourceInstance,
        state: &InstanceState,
    ) -> Result<Option<InstanceState>, ProviderError> {
        self.calls.lock().push(ProviderCall::Refresh {
            addr: addr.to_string(),
            id: state.id.clone(),
        });
        match self.refreshes.get(&state.id) {
            Some(Ok(result)) => Ok(result.clone()),
            Some(Err(reason)) => Err(ProviderError::Refresh {
                addr: addr.clone(),
                reason: reason.clone(),
            }),
            None => Ok(Some(state.clone())),
        }
    }
}
