//! Import graph nodes.
//!
//! [`ImportStateNode`] is added once per import target. Evaluating it asks
//! the provider for every object behind the requested ID; expanding it turns
//! those objects into one [`ImportStateSubNode`] each. A sub node refreshes
//! its object, checks it, and writes it to state.

use std::fmt;
use std::sync::Arc;

use strata_core::{AbsProviderConfig, AbsResourceInstance, ModuleInstance};
use strata_engine::{
    DynamicExpandable, EvalContext, EvalError, Evaluable, Graph, GraphNode, GraphTransformer,
    ProviderConsumer, RootTransformer, StepSequence, SubPath, run_sequence,
};
use strata_provider::ResourceProvider;
use strata_state::{InstanceState, ResourceState, StateStore};

use crate::conflict::scan_conflicts;
use crate::dedup::resolve_target_addresses;
use crate::error::ImportError;
use crate::transform::ImportTarget;

/// Where an [`ImportStateNode`] is in its life.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ImportPhase {
    /// Not evaluated yet, or the last evaluation failed.
    #[default]
    Created,
    /// The provider reported these objects.
    Evaluated(Vec<InstanceState>),
    /// Expanded into a subgraph with this many sub nodes.
    Expanded {
        /// Number of sub nodes created.
        subnodes: usize,
    },
}

/// Steps of [`ImportStateNode`] evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    /// Look up the resolved provider.
    GetProvider,
    /// Ask the provider for the objects behind the ID.
    ImportState,
}

impl fmt::Display for ImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GetProvider => f.write_str("get provider"),
            Self::ImportState => f.write_str("import state"),
        }
    }
}

/// Values handed between [`ImportStep`]s.
#[derive(Default)]
pub struct ImportSlots {
    provider: Option<Arc<dyn ResourceProvider>>,
    states: Option<Vec<InstanceState>>,
}

/// Imports one target.
#[derive(Debug, Clone)]
pub struct ImportStateNode {
    addr: AbsResourceInstance,
    id: String,
    provider_addr: AbsProviderConfig,
    resolved_provider: Option<AbsProviderConfig>,
    phase: ImportPhase,
}

impl ImportStateNode {
    /// Node for `target`, not yet resolved or evaluated.
    #[must_use]
    pub fn new(target: &ImportTarget) -> Self {
        Self {
            addr: target.addr.clone(),
            id: target.id.clone(),
            provider_addr: target.provider_addr.clone(),
            resolved_provider: None,
            phase: ImportPhase::Created,
        }
    }

    /// Address the import was requested for.
    #[must_use]
    pub fn addr(&self) -> &AbsResourceInstance {
        &self.addr
    }

    /// Requested remote ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Provider configuration chosen by provider resolution.
    #[must_use]
    pub fn resolved_provider(&self) -> Option<&AbsProviderConfig> {
        self.resolved_provider.as_ref()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> &ImportPhase {
        &self.phase
    }

    /// Objects found by the last evaluation. Empty unless evaluated.
    #[must_use]
    pub fn discovered(&self) -> &[InstanceState] {
        match &self.phase {
            ImportPhase::Evaluated(states) => states,
            _ => &[],
        }
    }

    /// Build the sub node graph from the evaluated objects.
    ///
    /// Fails without creating anything if any target address already holds
    /// an object in `store`; every such address is reported.
    pub fn expand(&mut self, store: &StateStore) -> Result<Graph, ImportError> {
        let ImportPhase::Evaluated(states) = &self.phase else {
            return Err(ImportError::NotEvaluated {
                addr: self.addr.clone(),
                id: self.id.clone(),
            });
        };
        let resolved = self
            .resolved_provider
            .clone()
            .ok_or_else(|| ImportError::ProviderNotResolved {
                addr: self.addr.clone(),
            })?;

        let targets = resolve_target_addresses(&self.addr, states);

        let state = store.read();
        scan_conflicts(&state, &targets)
            .into_result()
            .map_err(ImportError::Conflicts)?;
        drop(state);

        let mut graph = Graph::with_path(self.addr.module.clone());
        for (target, discovered) in targets.into_iter().zip(states) {
            graph.add(ImportStateSubNode::new(target, discovered.clone(), resolved.clone()));
        }
        let subnodes = graph.node_count();
        RootTransformer.transform(&mut graph)?;

        tracing::debug!(node = %self.name(), subnodes, "expanded import");
        self.phase = ImportPhase::Expanded { subnodes };
        Ok(graph)
    }
}

impl GraphNode for ImportStateNode {
    fn name(&self) -> String {
        format!("{} (import id {:?})", self.addr, self.id)
    }

    fn as_sub_path(&self) -> Option<&dyn SubPath> {
        Some(self)
    }

    fn as_evaluable(&mut self) -> Option<&mut dyn Evaluable> {
        Some(self)
    }

    fn as_dynamic_expandable(&mut self) -> Option<&mut dyn DynamicExpandable> {
        Some(self)
    }

    fn as_provider_consumer(&mut self) -> Option<&mut dyn ProviderConsumer> {
        Some(self)
    }
}

impl SubPath for ImportStateNode {
    fn path(&self) -> &ModuleInstance {
        &self.addr.module
    }
}

impl ProviderConsumer for ImportStateNode {
    fn provided_by(&self) -> (AbsProviderConfig, bool) {
        (self.provider_addr.clone(), false)
    }

    fn set_provider(&mut self, addr: AbsProviderConfig) {
        self.resolved_provider = Some(addr);
    }
}

impl StepSequence for ImportStateNode {
    type Step = ImportStep;
    type Slots = ImportSlots;

    fn steps(&self) -> &'static [ImportStep] {
        &[ImportStep::GetProvider, ImportStep::ImportState]
    }

    fn run_step(
        &self,
        step: ImportStep,
        ctx: &dyn EvalContext,
        slots: &mut ImportSlots,
    ) -> Result<(), EvalError> {
        match step {
            ImportStep::GetProvider => {
                let addr = self
                    .resolved_provider
                    .as_ref()
                    .ok_or_else(|| ImportError::ProviderNotResolved {
                        addr: self.addr.clone(),
                    })?;
                slots.provider = Some(ctx.provider(addr)?);
            }
            ImportStep::ImportState => {
                let provider = slots
                    .provider
                    .as_ref()
                    .ok_or_else(|| ImportError::ProviderNotResolved {
                        addr: self.addr.clone(),
                    })?;
                let states = provider.import_state(&self.addr, &self.id)?;
                tracing::debug!(
                    addr = %self.addr,
                    id = %self.id,
                    found = states.len(),
                    "provider imported state"
                );
                slots.states = Some(states);
            }
        }
        Ok(())
    }
}

impl Evaluable for ImportStateNode {
    fn eval(&mut self, ctx: &dyn EvalContext) -> Result<(), EvalError> {
        self.phase = ImportPhase::Created;
        let mut slots = ImportSlots::default();
        run_sequence(&*self, ctx, &mut slots)?;
        self.phase = ImportPhase::Evaluated(slots.states.unwrap_or_default());
        Ok(())
    }
}

impl DynamicExpandable for ImportStateNode {
    fn dynamic_expand(&mut self, ctx: &dyn EvalContext) -> Result<Graph, EvalError> {
        Ok(self.expand(ctx.state())?)
    }
}

/// Steps of [`ImportStateSubNode`] evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubImportStep {
    /// Look up the inherited provider.
    GetProvider,
    /// Require the object to carry a resource type.
    CheckType,
    /// Re-read the object from the provider.
    Refresh,
    /// Require the refreshed object to be the one that was requested.
    Verify,
    /// Store the object.
    WriteState,
}

impl fmt::Display for SubImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GetProvider => f.write_str("get provider"),
            Self::CheckType => f.write_str("check type"),
            Self::Refresh => f.write_str("refresh"),
            Self::Verify => f.write_str("verify"),
            Self::WriteState => f.write_str("write state"),
        }
    }
}

/// Values handed between [`SubImportStep`]s.
#[derive(Default)]
pub struct SubImportSlots {
    provider: Option<Arc<dyn ResourceProvider>>,
    state: Option<InstanceState>,
}

/// Refreshes and stores one object found by an [`ImportStateNode`].
#[derive(Debug, Clone)]
pub struct ImportStateSubNode {
    target_addr: AbsResourceInstance,
    state: InstanceState,
    resolved_provider: AbsProviderConfig,
}

impl ImportStateSubNode {
    /// Sub node storing `state` at `target_addr`.
    #[must_use]
    pub fn new(
        target_addr: AbsResourceInstance,
        state: InstanceState,
        resolved_provider: AbsProviderConfig,
    ) -> Self {
        Self {
            target_addr,
            state,
            resolved_provider,
        }
    }

    /// Address the object will be stored at.
    #[must_use]
    pub fn target_addr(&self) -> &AbsResourceInstance {
        &self.target_addr
    }

    /// The object as discovered.
    #[must_use]
    pub fn state(&self) -> &InstanceState {
        &self.state
    }

    /// Provider inherited from the parent node.
    #[must_use]
    pub fn resolved_provider(&self) -> &AbsProviderConfig {
        &self.resolved_provider
    }

    fn verify_failed(&self, reason: impl Into<String>) -> ImportError {
        ImportError::VerifyFailed {
            addr: self.target_addr.clone(),
            id: self.state.id.clone(),
            reason: reason.into(),
        }
    }
}

impl GraphNode for ImportStateSubNode {
    fn name(&self) -> String {
        format!("import {} result: {}", self.target_addr, self.state.id)
    }

    fn as_sub_path(&self) -> Option<&dyn SubPath> {
        Some(self)
    }

    fn as_evaluable(&mut self) -> Option<&mut dyn Evaluable> {
        Some(self)
    }
}

impl SubPath for ImportStateSubNode {
    fn path(&self) -> &ModuleInstance {
        &self.target_addr.module
    }
}

impl StepSequence for ImportStateSubNode {
    type Step = SubImportStep;
    type Slots = SubImportSlots;

    fn steps(&self) -> &'static [SubImportStep] {
        &[
            SubImportStep::GetProvider,
            SubImportStep::CheckType,
            SubImportStep::Refresh,
            SubImportStep::Verify,
            SubImportStep::WriteState,
        ]
    }

    fn run_step(
        &self,
        step: SubImportStep,
        ctx: &dyn EvalContext,
        slots: &mut SubImportSlots,
    ) -> Result<(), EvalError> {
        match step {
            SubImportStep::GetProvider => {
                slots.provider = Some(ctx.provider(&self.resolved_provider)?);
            }
            SubImportStep::CheckType => {
                if self.state.ephemeral.type_name.is_empty() {
                    return Err(ImportError::MissingType {
                        addr: self.target_addr.clone(),
                        id: self.state.id.clone(),
                    }
                    .into());
                }
            }
            SubImportStep::Refresh => {
                let provider = slots
                    .provider
                    .as_ref()
                    .ok_or_else(|| ImportError::ProviderNotResolved {
                        addr: self.target_addr.clone(),
                    })?;
                let working = slots.state.take().unwrap_or_else(|| self.state.clone());
                slots.state = provider.refresh(&self.target_addr, &working)?;
            }
            SubImportStep::Verify => match &slots.state {
                None => return Err(self.verify_failed("no object exists with the given id").into()),
                Some(state) if state.is_empty() => {
                    return Err(self.verify_failed("no object exists with the given id").into());
                }
                Some(state) if state.id != self.state.id => {
                    let reason = format!(
                        "the provider returned a different object, {:?}",
                        state.id
                    );
                    return Err(self.verify_failed(reason).into());
                }
                Some(_) => {}
            },
            SubImportStep::WriteState => {
                let state = slots
                    .state
                    .take()
                    .ok_or_else(|| self.verify_failed("no object to write"))?;
                let key = self.target_addr.legacy_state_key();
                let record = ResourceState::for_instance(
                    &self.target_addr,
                    self.resolved_provider.clone(),
                    state,
                );

                let mut guard = ctx.state().write();
                guard.put(&self.target_addr.module, key, record);
                drop(guard);

                tracing::info!(
                    addr = %self.target_addr,
                    id = %self.state.id,
                    "imported resource into state"
                );
            }
        }
        Ok(())
    }
}

impl Evaluable for ImportStateSubNode {
    fn eval(&mut self, ctx: &dyn EvalContext) -> Result<(), EvalError> {
        let mut slots = SubImportSlots {
            provider: None,
            state: Some(self.state.clone()),
        };
        run_sequence(&*self, ctx, &mut slots)
    }
}
