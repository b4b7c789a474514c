//! Parameters shared by the roadmap and tree planners

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::common::{euclidean, Configuration, PlannerError, PlannerResult, SharedMetric};

/// Projects a candidate configuration onto the constraint manifold.
///
/// Called with the configuration being extended from and the candidate, which
/// it may modify in place. Returns false if no valid projection exists.
pub type ConstraintFn = Arc<dyn Fn(&Configuration, &mut Configuration) -> bool + Send + Sync>;

/// Replaces `a` with the difference `a - b`, e.g. wrapping revolute joints
pub type DiffStateFn = Arc<dyn Fn(&mut Configuration, &Configuration) + Send + Sync>;

pub const DEFAULT_NODE_BUDGET: usize = 100;
pub const DEFAULT_NEIGHBOR_THRESHOLD: f64 = 5.0;
pub const DEFAULT_STEP_LENGTH: f64 = 0.04;
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;
pub const DEFAULT_MAX_SAMPLE_FAILURES: usize = 10_000;

/// Configuration for the planners
#[derive(Clone)]
pub struct PlannerParams {
    /// Active DOF of the configurations being planned over
    pub dof: usize,
    /// Number of samples in the roadmap
    pub node_budget: usize,
    /// Maximum distance at which two configurations may be joined
    pub neighbor_threshold: f64,
    /// Stop connecting a new roadmap node once it has this many edges
    pub max_edges_per_node: Option<usize>,
    /// Tree extension step length
    pub step_length: f64,
    /// Rounds of tree growth before giving up
    pub max_iterations: usize,
    /// Consecutive sampler failures tolerated before giving up
    pub max_sample_failures: usize,
    pub start: Configuration,
    pub goal: Configuration,
    pub metric: SharedMetric,
    pub constraint_fn: Option<ConstraintFn>,
    pub diff_state_fn: Option<DiffStateFn>,
    /// Write the roadmap as a Graphviz file after it is built
    pub roadmap_dump: Option<PathBuf>,
}

impl Default for PlannerParams {
    fn default() -> Self {
        Self {
            dof: 0,
            node_budget: DEFAULT_NODE_BUDGET,
            neighbor_threshold: DEFAULT_NEIGHBOR_THRESHOLD,
            max_edges_per_node: None,
            step_length: DEFAULT_STEP_LENGTH,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_sample_failures: DEFAULT_MAX_SAMPLE_FAILURES,
            start: Configuration::zeros(0),
            goal: Configuration::zeros(0),
            metric: euclidean(),
            constraint_fn: None,
            diff_state_fn: None,
            roadmap_dump: None,
        }
    }
}

impl PlannerParams {
    /// Parameters for planning between `start` and `goal`; `dof` follows `start`
    pub fn new(start: Configuration, goal: Configuration) -> Self {
        Self {
            dof: start.len(),
            start,
            goal,
            ..Default::default()
        }
    }

    pub fn with_node_budget(mut self, node_budget: usize) -> Self {
        self.node_budget = node_budget;
        self
    }

    pub fn with_neighbor_threshold(mut self, threshold: f64) -> Self {
        self.neighbor_threshold = threshold;
        self
    }

    pub fn with_max_edges_per_node(mut self, max_edges: usize) -> Self {
        self.max_edges_per_node = Some(max_edges);
        self
    }

    pub fn with_step_length(mut self, step_length: f64) -> Self {
        self.step_length = step_length;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_sample_failures(mut self, max_failures: usize) -> Self {
        self.max_sample_failures = max_failures;
        self
    }

    pub fn with_metric(mut self, metric: SharedMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_constraint_fn(mut self, constraint_fn: ConstraintFn) -> Self {
        self.constraint_fn = Some(constraint_fn);
        self
    }

    pub fn with_diff_state_fn(mut self, diff_state_fn: DiffStateFn) -> Self {
        self.diff_state_fn = Some(diff_state_fn);
        self
    }

    pub fn with_roadmap_dump<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.roadmap_dump = Some(path.into());
        self
    }

    /// `a <- a - b`, through the configured differencing function if any
    pub fn diff_state(&self, a: &mut Configuration, b: &Configuration) {
        match &self.diff_state_fn {
            Some(diff) => diff(a, b),
            None => *a -= b,
        }
    }

    pub fn distance(&self, a: &Configuration, b: &Configuration) -> f64 {
        self.metric.eval(a, b)
    }

    /// Reject parameter sets no planner can work with
    pub fn validate(&self) -> PlannerResult<()> {
        if self.node_budget == 0 {
            return Err(PlannerError::InvalidParameter(
                "node budget must be positive".to_string(),
            ));
        }
        if !(self.neighbor_threshold > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "neighbor threshold must be positive, got {}",
                self.neighbor_threshold
            )));
        }
        if !(self.step_length > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "step length must be positive, got {}",
                self.step_length
            )));
        }
        if self.max_edges_per_node == Some(0) {
            return Err(PlannerError::InvalidParameter(
                "edge budget per node must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for PlannerParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannerParams")
            .field("dof", &self.dof)
            .field("node_budget", &self.node_budget)
            .field("neighbor_threshold", &self.neighbor_threshold)
            .field("max_edges_per_node", &self.max_edges_per_node)
            .field("step_length", &self.step_length)
            .field("max_iterations", &self.max_iterations)
            .field("max_sample_failures", &self.max_sample_failures)
            .field("start", &self.start.as_slice())
            .field("goal", &self.goal.as_slice())
            .field("constraint_fn", &self.constraint_fn.is_some())
            .field("diff_state_fn", &self.diff_state_fn.is_some())
            .field("roadmap_dump", &self.roadmap_dump)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config_from_slice;

    #[test]
    fn test_params_default() {
        let params = PlannerParams::default();
        assert_eq!(params.node_budget, 100);
        assert_eq!(params.neighbor_threshold, 5.0);
        assert_eq!(params.step_length, 0.04);
        assert!(params.constraint_fn.is_none());
    }

    #[test]
    fn test_params_validate() {
        let params = PlannerParams::new(config_from_slice(&[0.0]), config_from_slice(&[1.0]));
        assert_eq!(params.dof, 1);
        assert!(params.validate().is_ok());
        assert!(params.clone().with_neighbor_threshold(0.0).validate().is_err());
        assert!(params.clone().with_node_budget(0).validate().is_err());
        assert!(params.with_step_length(-1.0).validate().is_err());
    }

    #[test]
    fn test_diff_state_default_and_custom() {
        let params = PlannerParams::default();
        let mut a = config_from_slice(&[3.0, 1.0]);
        params.diff_state(&mut a, &config_from_slice(&[1.0, 1.0]));
        assert_eq!(a, config_from_slice(&[2.0, 0.0]));

        let params = params.with_diff_state_fn(Arc::new(|a: &mut Configuration, b: &Configuration| {
            *a -= b;
            *a *= 2.0;
        }));
        let mut a = config_from_slice(&[3.0, 1.0]);
        params.diff_state(&mut a, &config_from_slice(&[1.0, 1.0]));
        assert_eq!(a, config_from_slice(&[4.0, 0.0]));
    }
}
