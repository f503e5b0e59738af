#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Strata Engine
//!
//! The graph machinery import nodes run on:
//!
//! - [`Graph`] of boxed [`GraphNode`]s with opt-in capabilities
//!   ([`Evaluable`], [`DynamicExpandable`], [`ProviderConsumer`], [`SubPath`])
//! - [`GraphTransformer`] passes: [`RootTransformer`], [`ProviderTransformer`]
//! - [`StepSequence`] / [`run_sequence`] for nodes built from ordered steps
//! - [`Walker`], which runs a graph level by level with bounded parallelism
//!   and walks every dynamically expanded subgraph

pub mod capability;
pub mod context;
pub mod error;
pub mod graph;
pub mod sequence;
pub mod transform;
pub mod walker;

pub use capability::{
    DynamicExpandable, Evaluable, GraphNode, ProviderConsumer, RootNode, SubPath,
};
pub use context::{BuiltinEvalContext, EvalContext};
pub use error::{EngineError, EvalError};
pub use graph::Graph;
pub use petgraph::graph::NodeIndex;
pub use sequence::{StepSequence, run_sequence};
pub use transform::{GraphTransformer, ProviderTransformer, RootTransformer};
pub use walker::{DEFAULT_MAX_PARALLEL, NodeFailure, WalkReport, Walker, WalkerConfig};
