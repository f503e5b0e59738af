//! Node graph built on `petgraph`.

use std::any::Any;
use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use strata_core::ModuleInstance;

use crate::capability::GraphNode;
use crate::error::EngineError;

/// A directed graph of nodes. An edge `a -> b` means `b` runs after `a`.
#[derive(Debug, Default)]
pub struct Graph {
    path: ModuleInstance,
    inner: DiGraph<Box<dyn GraphNode>, ()>,
}

impl Graph {
    /// Empty graph for the root module.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty graph scoped to `path`.
    #[must_use]
    pub fn with_path(path: ModuleInstance) -> Self {
        Self {
            path,
            inner: DiGraph::new(),
        }
    }

    /// Module this graph was built for.
    #[must_use]
    pub fn path(&self) -> &ModuleInstance {
        &self.path
    }

    /// Add a node without edges.
    pub fn add(&mut self, node: impl GraphNode) -> NodeIndex {
        self.inner.add_node(Box::new(node))
    }

    /// Add an already boxed node without edges.
    pub fn add_boxed(&mut self, node: Box<dyn GraphNode>) -> NodeIndex {
        self.inner.add_node(node)
    }

    /// Make `to` run after `from`.
    pub fn connect(&mut self, from: NodeIndex, to: NodeIndex) {
        self.inner.update_edge(from, to, ());
    }

    /// The node at `idx`.
    #[must_use]
    pub fn node(&self, idx: NodeIndex) -> Option<&dyn GraphNode> {
        self.inner.node_weight(idx).map(|n| &**n)
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &dyn GraphNode> {
        self.inner.node_weights().map(|n| &**n)
    }

    /// All nodes, mutably, in insertion order.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn GraphNode>> {
        self.inner.node_weights_mut()
    }

    /// All nodes of concrete type `T`.
    pub fn downcast_nodes<T: GraphNode>(&self) -> impl Iterator<Item = &T> {
        self.inner
            .node_weights()
            .filter_map(|n| (&**n as &dyn Any).downcast_ref::<T>())
    }

    /// Indices of all nodes, in insertion order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.inner.node_indices()
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Nodes with no incoming edges.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeIndex> {
        self.inner
            .node_indices()
            .filter(|&idx| {
                self.inner
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect()
    }

    /// Nodes that must finish before `idx` runs.
    #[must_use]
    pub fn predecessors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.inner
            .neighbors_directed(idx, Direction::Incoming)
            .collect()
    }

    /// Nodes that run after `idx`.
    #[must_use]
    pub fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.inner
            .neighbors_directed(idx, Direction::Outgoing)
            .collect()
    }

    /// Returns `true` if the graph contains at least one cycle.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.inner)
    }

    /// Compute parallel execution levels using Kahn's algorithm.
    ///
    /// Each level contains nodes whose predecessors all appear in earlier
    /// levels, so the nodes within one level can run concurrently.
    pub fn compute_levels(&self) -> Result<Vec<Vec<NodeIndex>>, EngineError> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .inner
            .node_indices()
            .map(|idx| {
                let degree = self
                    .inner
                    .neighbors_directed(idx, Direction::Incoming)
                    .count();
                (idx, degree)
            })
            .collect();

        let mut levels = Vec::new();
        let mut remaining: Vec<NodeIndex> = self.inner.node_indices().collect();

        while !remaining.is_empty() {
            let current: Vec<NodeIndex> = remaining
                .iter()
                .filter(|idx| in_degree[idx] == 0)
                .copied()
                .collect();

            if current.is_empty() {
                return Err(EngineError::CycleDetected);
            }

            for &idx in &current {
                for next in self.inner.neighbors_directed(idx, Direction::Outgoing) {
                    in_degree.entry(next).and_modify(|deg| *deg -= 1);
                }
            }

            remaining.retain(|idx| !current.contains(idx));
            for idx in &current {
                in_degree.remove(idx);
            }

            levels.push(current);
        }

        Ok(levels)
    }

    /// Mutable access to every node, indexed by `NodeIndex::index()`.
    pub(crate) fn slots_mut(&mut self) -> Vec<Option<&mut Box<dyn GraphNode>>> {
        self.inner.node_weights_mut().map(Some).collect()
    }
}
