//! Incrementally grown configuration tree
//!
//! Nodes are appended to an arena and refer to their parent by index, so a
//! tree can never contain a cycle. Two of these are grown toward each other by
//! the bidirectional planner.

use log::trace;

use crate::common::{Configuration, SharedMetric};
use crate::path_planning::params::PlannerParams;

/// A target closer than this fraction of the step length counts as reached
const CONNECT_FRACTION: f64 = 0.1;
/// A step shorter than this fraction of the step length counts as stalled
const STALL_FRACTION: f64 = 0.01;

/// Outcome of [`SpatialTree::extend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendStatus {
    /// No node could be added
    Failed,
    /// At least one node was added, but the target was not reached
    Success,
    /// The tree reached the target (or took its single step)
    Connected,
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    /// `None` only for the root
    pub parent: Option<usize>,
    pub config: Configuration,
}

/// What a tree needs from its planner while extending
pub trait TreeContext {
    fn params(&self) -> &PlannerParams;

    /// True if the segment `from -> to` may not be added, with `from` already
    /// known to be valid
    fn in_collision(&self, from: &Configuration, to: &Configuration) -> bool;
}

pub struct SpatialTree {
    nodes: Vec<TreeNode>,
    metric: SharedMetric,
    step_length: f64,
    dof: usize,
    best_dist: f64,
}

impl SpatialTree {
    pub fn new(dof: usize, step_length: f64, metric: SharedMetric) -> Self {
        SpatialTree {
            nodes: Vec::new(),
            metric,
            step_length,
            dof,
            best_dist: 0.0,
        }
    }

    /// Tree with a single root node
    pub fn with_root(root: Configuration, step_length: f64, metric: SharedMetric) -> Self {
        let mut tree = Self::new(root.len(), step_length, metric);
        tree.add_node(None, root);
        tree
    }

    /// Drop every node, optionally changing the DOF
    pub fn reset(&mut self, dof: Option<usize>) {
        self.nodes.clear();
        self.best_dist = 0.0;
        if let Some(dof) = dof {
            self.dof = dof;
        }
    }

    pub fn add_node(&mut self, parent: Option<usize>, config: Configuration) -> usize {
        self.nodes.push(TreeNode { parent, config });
        self.nodes.len() - 1
    }

    /// Index of the node closest to `q`, `None` for an empty tree.
    /// Records the winning distance in [`best_distance`](Self::best_distance).
    pub fn get_nn(&mut self, q: &Configuration) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, node) in self.nodes.iter().enumerate() {
            let d = self.metric.eval(q, &node.config);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((i, d));
            }
        }

        let (index, dist) = best?;
        self.best_dist = dist;
        Some(index)
    }

    /// Walk from the nearest node toward `target` in steps of at most the
    /// step length, appending a node per step.
    ///
    /// Stops with `Connected` once the frontier is within a tenth of a step of
    /// the target. A rejected, unprojectable or stalled step ends the walk with
    /// `Success` if anything was added during this call and `Failed`
    /// otherwise. With `one_step`, the first accepted step reports `Connected`.
    ///
    /// Also returns the index of the last frontier node, `None` only when the
    /// tree is empty.
    pub fn extend<C: TreeContext>(
        &mut self,
        ctx: &C,
        target: &Configuration,
        one_step: bool,
    ) -> (ExtendStatus, Option<usize>) {
        let mut last = match self.get_nn(target) {
            Some(index) => index,
            None => return (ExtendStatus::Failed, None),
        };
        let params = ctx.params();
        let mut added = false;
        let halted = |added: bool| {
            if added {
                ExtendStatus::Success
            } else {
                ExtendStatus::Failed
            }
        };

        loop {
            let current = &self.nodes[last].config;
            let dist = self.metric.eval(target, current);
            if dist <= CONNECT_FRACTION * self.step_length {
                return (ExtendStatus::Connected, Some(last));
            }
            let scale = if dist > self.step_length {
                self.step_length / dist
            } else {
                1.0
            };

            let mut new_config = target.clone();
            params.diff_state(&mut new_config, current);
            new_config *= scale;
            new_config += current;

            if let Some(constraint) = &params.constraint_fn {
                if !constraint(current, &mut new_config) {
                    trace!("constraint projection failed, added = {}", added);
                    return (halted(added), Some(last));
                }
            }

            // otherwise a projection that pins the node would loop forever
            if self.metric.eval(current, &new_config) <= STALL_FRACTION * self.step_length {
                return (halted(added), Some(last));
            }

            if ctx.in_collision(current, &new_config) {
                return (halted(added), Some(last));
            }

            last = self.add_node(Some(last), new_config);
            added = true;
            if one_step {
                return (ExtendStatus::Connected, Some(last));
            }
        }
    }

    /// Indices from `index` up to the root, `index` first
    pub fn trace_to_root(&self, index: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            chain.push(i);
            current = self.nodes[i].parent;
        }
        chain
    }

    pub fn get_config(&self, index: usize) -> &Configuration {
        &self.nodes[index].config
    }

    pub fn get_dof(&self) -> usize {
        self.dof
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Distance found by the last successful `get_nn`
    pub fn best_distance(&self) -> f64 {
        self.best_dist
    }

    pub fn step_length(&self) -> f64 {
        self.step_length
    }
}
