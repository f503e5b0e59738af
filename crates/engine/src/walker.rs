//! Graph walker.
//!
//! Executes a [`Graph`] level by level. Nodes in one level have no
//! dependencies on each other and are drained by the calling thread plus
//! helper threads. A node is evaluated, then expanded, and its subgraph is
//! walked before the node counts as done.
//!
//! [`WalkerConfig::max_parallel`] bounds the whole walk, expanded subgraphs
//! included: helper threads draw from one budget shared by every nested walk,
//! and a walk that finds the budget spent runs its nodes on its own thread.

use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use parking_lot::Mutex;
use petgraph::graph::NodeIndex;

use crate::capability::GraphNode;
use crate::context::EvalContext;
use crate::error::{EngineError, EvalError};
use crate::graph::Graph;

/// Default number of nodes evaluated at once.
pub const DEFAULT_MAX_PARALLEL: usize = 10;

/// Walker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Upper bound on nodes evaluated concurrently, across the graph and
    /// every subgraph expanded from it.
    pub max_parallel: usize,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_parallel: DEFAULT_MAX_PARALLEL,
        }
    }
}

/// A node that did not complete.
#[derive(Debug)]
pub struct NodeFailure {
    /// Name of the failed node.
    pub node: String,
    /// Why it failed.
    pub error: EvalError,
}

/// Outcome of a walk, including the walks of every expanded subgraph.
#[derive(Debug, Default)]
pub struct WalkReport {
    /// Nodes that evaluated or expanded successfully, in graph order.
    /// Structural nodes without either capability (such as the synthetic
    /// root) are not listed.
    pub completed: Vec<String>,
    /// Nodes whose evaluation or expansion failed.
    pub failures: Vec<NodeFailure>,
    /// Nodes not run because something they depend on did not complete.
    pub skipped: Vec<String>,
}

impl WalkReport {
    /// `true` when nothing failed and nothing was skipped.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }

    /// Fold a subgraph's report into this one.
    pub fn merge(&mut self, other: Self) {
        self.completed.extend(other.completed);
        self.failures.extend(other.failures);
        self.skipped.extend(other.skipped);
    }

    /// The failure recorded for `node`, if any.
    #[must_use]
    pub fn failure(&self, node: &str) -> Option<&EvalError> {
        self.failures
            .iter()
            .find(|f| f.node == node)
            .map(|f| &f.error)
    }
}

/// Helper threads still available to a walk and its nested walks.
#[derive(Debug)]
struct ThreadBudget {
    spare: AtomicUsize,
}

impl ThreadBudget {
    /// The calling thread is one of the `max_parallel` workers.
    fn new(max_parallel: usize) -> Self {
        Self {
            spare: AtomicUsize::new(max_parallel.max(1) - 1),
        }
    }

    /// Take up to `wanted` helpers; returns how many were granted.
    fn take(&self, wanted: usize) -> usize {
        let mut granted = 0;
        let _ = self
            .spare
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |spare| {
                granted = wanted.min(spare);
                Some(spare - granted)
            });
        granted
    }

    fn give_back(&self, helpers: usize) {
        self.spare.fetch_add(helpers, Ordering::AcqRel);
    }
}

/// Executes graphs against an [`EvalContext`].
pub struct Walker<'a> {
    ctx: &'a dyn EvalContext,
    config: WalkerConfig,
    budget: ThreadBudget,
}

impl std::fmt::Debug for Walker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("config", &self.config)
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

type Queue<'g> = Mutex<VecDeque<(usize, NodeIndex, &'g mut Box<dyn GraphNode>)>>;

struct Outcome {
    idx: NodeIndex,
    name: String,
    /// Whether the node evaluates or expands, i.e. belongs in `completed`.
    counted: bool,
    result: Result<Option<WalkReport>, EvalError>,
}

impl<'a> Walker<'a> {
    /// Walker over `ctx`.
    #[must_use]
    pub fn new(ctx: &'a dyn EvalContext, config: WalkerConfig) -> Self {
        Self {
            ctx,
            config,
            budget: ThreadBudget::new(config.max_parallel),
        }
    }

    /// Walk `graph` to completion.
    ///
    /// Node failures are collected in the report; the only error is a graph
    /// that cannot be scheduled.
    pub fn walk(&self, graph: &mut Graph) -> Result<WalkReport, EngineError> {
        let levels = graph.compute_levels()?;
        let mut report = WalkReport::default();
        let mut blocked: HashSet<NodeIndex> = HashSet::new();

        for level in levels {
            let mut runnable = Vec::with_capacity(level.len());
            for idx in level {
                if graph.predecessors(idx).iter().any(|p| blocked.contains(p)) {
                    if let Some(node) = graph.node(idx) {
                        tracing::debug!(
                            node = %node.name(),
                            "skipping node, a dependency did not complete"
                        );
                        report.skipped.push(node.name());
                    }
                    blocked.insert(idx);
                } else {
                    runnable.push(idx);
                }
            }

            let mut slots = graph.slots_mut();
            let work: VecDeque<_> = runnable
                .into_iter()
                .filter_map(|idx| slots.get_mut(idx.index())?.take().map(|n| (idx, n)))
                .enumerate()
                .map(|(pos, (idx, node))| (pos, idx, node))
                .collect();

            for outcome in self.run_level(work) {
                match outcome.result {
                    Ok(sub_report) => {
                        if outcome.counted {
                            report.completed.push(outcome.name);
                        }
                        if let Some(sub_report) = sub_report {
                            report.merge(sub_report);
                        }
                    }
                    Err(error) => {
                        tracing::error!(node = %outcome.name, %error, "node failed");
                        blocked.insert(outcome.idx);
                        report.failures.push(NodeFailure {
                            node: outcome.name,
                            error,
                        });
                    }
                }
            }
        }

        Ok(report)
    }

    /// Run every node of one level and return the outcomes in level order.
    fn run_level(
        &self,
        work: VecDeque<(usize, NodeIndex, &mut Box<dyn GraphNode>)>,
    ) -> Vec<Outcome> {
        let helpers = self.budget.take(work.len().saturating_sub(1));
        let queue: Queue<'_> = Mutex::new(work);
        let done = Mutex::new(Vec::new());

        if helpers == 0 {
            self.drain(&queue, &done);
        } else {
            tracing::trace!(helpers, "running level on helper threads");
            thread::scope(|scope| {
                for _ in 0..helpers {
                    scope.spawn(|| {
                        self.drain(&queue, &done);
                        self.budget.give_back(1);
                    });
                }
                self.drain(&queue, &done);
            });
        }

        let mut done = done.into_inner();
        done.sort_by_key(|(pos, _)| *pos);
        done.into_iter().map(|(_, outcome)| outcome).collect()
    }

    fn drain(&self, queue: &Queue<'_>, done: &Mutex<Vec<(usize, Outcome)>>) {
        loop {
            let next = queue.lock().pop_front();
            let Some((pos, idx, node)) = next else {
                return;
            };
            let name = node.name();
            let counted = node.as_evaluable().is_some() || node.as_dynamic_expandable().is_some();
            let result = panic::catch_unwind(AssertUnwindSafe(|| self.run_node(&mut **node)))
                .unwrap_or_else(|payload| Err(EvalError::Panicked(panic_message(&*payload))));
            done.lock().push((
                pos,
                Outcome {
                    idx,
                    name,
                    counted,
                    result,
                },
            ));
        }
    }

    fn run_node(&self, node: &mut dyn GraphNode) -> Result<Option<WalkReport>, EvalError> {
        let span = tracing::debug_span!("node", node = %node.name());
        let _guard = span.enter();

        if let Some(evaluable) = node.as_evaluable() {
            evaluable.eval(self.ctx)?;
        }

        let Some(expandable) = node.as_dynamic_expandable() else {
            return Ok(None);
        };
        let mut subgraph = expandable.dynamic_expand(self.ctx)?;
        tracing::debug!(nodes = subgraph.node_count(), "walking expanded subgraph");
        Ok(Some(self.walk(&mut subgraph)?))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_owned())
}
