//! Node capabilities.
//!
//! A graph node is a [`GraphNode`] plus whichever small capability traits it
//! opts into. The engine asks a node for a capability through the
//! `as_*` accessors; the defaults say "not supported".

use std::any::Any;
use std::fmt;

use strata_core::{AbsProviderConfig, ModuleInstance};

use crate::context::EvalContext;
use crate::error::EvalError;
use crate::graph::Graph;

/// A vertex of a [`Graph`].
pub trait GraphNode: Any + fmt::Debug + Send + Sync {
    /// Display name, used in logs and walk reports.
    fn name(&self) -> String;

    /// Module-path capability.
    fn as_sub_path(&self) -> Option<&dyn SubPath> {
        None
    }

    /// Evaluation capability.
    fn as_evaluable(&mut self) -> Option<&mut dyn Evaluable> {
        None
    }

    /// Dynamic-expansion capability.
    fn as_dynamic_expandable(&mut self) -> Option<&mut dyn DynamicExpandable> {
        None
    }

    /// Provider-consumer capability.
    fn as_provider_consumer(&mut self) -> Option<&mut dyn ProviderConsumer> {
        None
    }
}

/// A node that belongs to a specific module.
pub trait SubPath {
    /// The module the node operates in.
    fn path(&self) -> &ModuleInstance;
}

/// A node that does work when the walker reaches it.
pub trait Evaluable {
    /// Run the node. Errors are fatal for this node only.
    fn eval(&mut self, ctx: &dyn EvalContext) -> Result<(), EvalError>;
}

/// A node that turns into a subgraph once it has been evaluated.
///
/// The walker calls [`dynamic_expand`](Self::dynamic_expand) once, right
/// after a successful [`Evaluable::eval`], and walks the returned graph.
pub trait DynamicExpandable {
    /// Build the subgraph.
    fn dynamic_expand(&mut self, ctx: &dyn EvalContext) -> Result<Graph, EvalError>;
}

/// A node that needs a configured provider.
///
/// A provider-resolution pass reads [`provided_by`](Self::provided_by) and
/// answers with [`set_provider`](Self::set_provider) before the walk.
pub trait ProviderConsumer {
    /// The provider configuration the node asks for, and whether it must be
    /// used exactly (`true`) or may be inherited from a parent module.
    fn provided_by(&self) -> (AbsProviderConfig, bool);

    /// Record the configuration the node was resolved to.
    fn set_provider(&mut self, addr: AbsProviderConfig);
}

/// Synthetic single entry point added by
/// [`RootTransformer`](crate::transform::RootTransformer).
#[derive(Debug, Clone, Copy, Default)]
pub struct RootNode;

impl GraphNode for RootNode {
    fn name(&self) -> String {
        "root".to_owned()
    }
}
