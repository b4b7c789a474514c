//! Bidirectional RRT planning in configuration space
//!
//! Two trees are grown, one rooted at the start and one at the goal. Each
//! round one tree extends toward a random sample and the other extends toward
//! whatever the first one reached; then the two swap roles. Once the second
//! extension connects, the path is read off both trees' parent chains.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use log::{debug, error, info, warn};

use crate::common::{
    CollisionChecker, Configuration, IntervalType, MotionPlanner, PlannerError, PlannerResult,
    Robot, RobotStateSaver, Sampler, Trajectory,
};
use crate::path_planning::params::PlannerParams;
use crate::spatial::{ExtendStatus, SpatialTree, TreeContext};

const START_TREE: usize = 0;
const GOAL_TREE: usize = 1;

/// Collision access handed to the trees while they extend
struct PlanningContext<'a, R, C> {
    params: &'a PlannerParams,
    robot: &'a R,
    checker: &'a C,
}

impl<'a, R, C> TreeContext for PlanningContext<'a, R, C>
where
    R: Robot,
    C: CollisionChecker<R>,
{
    fn params(&self) -> &PlannerParams {
        self.params
    }

    fn in_collision(&self, from: &Configuration, to: &Configuration) -> bool {
        self.checker
            .check_collision(self.params, self.robot, from, to, IntervalType::OpenStart)
    }
}

/// Where the trees met: a node index in each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Meeting {
    start_index: usize,
    goal_index: usize,
}

/// Bidirectional tree planner over an external robot, collision checker and
/// sampler
pub struct TreePlanner<R, C, S> {
    checker: C,
    sampler: S,
    robot: Option<Arc<Mutex<R>>>,
    params: Option<PlannerParams>,
    trees: Option<[SpatialTree; 2]>,
    iterations: usize,
}

impl<R, C, S> TreePlanner<R, C, S>
where
    R: Robot,
    C: CollisionChecker<R>,
    S: Sampler,
{
    pub fn new(checker: C, sampler: S) -> Self {
        TreePlanner {
            checker,
            sampler,
            robot: None,
            params: None,
            trees: None,
            iterations: 0,
        }
    }

    /// Start-side and goal-side trees from the last `plan_path`
    pub fn trees(&self) -> Option<(&SpatialTree, &SpatialTree)> {
        self.trees
            .as_ref()
            .map(|trees| (&trees[START_TREE], &trees[GOAL_TREE]))
    }

    /// Rounds used by the last `plan_path`
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl<R, C, S> MotionPlanner<R> for TreePlanner<R, C, S>
where
    R: Robot,
    C: CollisionChecker<R>,
    S: Sampler,
{
    fn init_plan(&mut self, robot: Arc<Mutex<R>>, mut params: PlannerParams) -> PlannerResult<()> {
        info!("Initializing bidirectional tree planner");
        params.validate()?;
        params.dof = robot
            .lock()
            .map_err(|_| PlannerError::EnvironmentLock)?
            .active_dof();

        self.robot = Some(robot);
        self.params = Some(params);
        self.trees = None;
        Ok(())
    }

    fn plan_path(&mut self, trajectory: &mut Trajectory) -> PlannerResult<()> {
        let (robot, params) = match (&self.robot, &self.params) {
            (Some(robot), Some(params)) => (robot, params),
            _ => {
                error!("plan_path called before init_plan");
                return Err(PlannerError::NotInitialized);
            }
        };

        let base_time = Instant::now();
        let mut guard = robot.lock().map_err(|_| PlannerError::EnvironmentLock)?;
        let robot_state = RobotStateSaver::new(&mut *guard);

        for &(which, config) in [("start", &params.start), ("goal", &params.goal)].iter() {
            if config.len() != params.dof {
                error!("Specified {} configuration is invalid", which);
                return Err(PlannerError::InvalidConfiguration {
                    which,
                    expected: params.dof,
                    actual: config.len(),
                });
            }
        }

        let mut trees = [
            SpatialTree::with_root(params.start.clone(), params.step_length, params.metric.clone()),
            SpatialTree::with_root(params.goal.clone(), params.step_length, params.metric.clone()),
        ];
        let ctx = PlanningContext {
            params,
            robot: &*robot_state,
            checker: &self.checker,
        };

        self.iterations = 0;
        let meeting = match grow_trees(&mut trees, &mut self.sampler, &ctx, &mut self.iterations) {
            Ok(meeting) => meeting,
            Err(e) => {
                self.trees = Some(trees);
                return Err(e);
            }
        };
        let path = trace_path(&trees, meeting, params);
        self.trees = Some(trees);

        let n_points = path.len();
        for q in path {
            trajectory.add_point(q);
        }

        info!(
            "plan success, path={} points in {:.3}s",
            n_points,
            base_time.elapsed().as_secs_f64()
        );
        Ok(())
    }

    fn parameters(&self) -> Option<&PlannerParams> {
        self.params.as_ref()
    }
}

/// Both trees, the one currently extending toward samples first
fn pair_mut(trees: &mut [SpatialTree; 2], active: usize) -> (&mut SpatialTree, &mut SpatialTree) {
    let (first, second) = trees.split_at_mut(1);
    if active == START_TREE {
        (&mut first[0], &mut second[0])
    } else {
        (&mut second[0], &mut first[0])
    }
}

/// Alternate extensions until the trees meet or the round budget runs out.
/// `rounds` tracks the rounds started so far, whatever the outcome.
fn grow_trees<R, C, S>(
    trees: &mut [SpatialTree; 2],
    sampler: &mut S,
    ctx: &PlanningContext<'_, R, C>,
    rounds: &mut usize,
) -> PlannerResult<Meeting>
where
    R: Robot,
    C: CollisionChecker<R>,
    S: Sampler,
{
    let params = ctx.params;
    let mut active = START_TREE;
    let mut failures = 0;

    for iteration in 1..=params.max_iterations {
        *rounds = iteration;
        let sample = match sampler.gen_single_sample() {
            Some(q) if q.len() == params.dof => {
                failures = 0;
                q
            }
            _ => {
                warn!("Error in sampling");
                failures += 1;
                if failures >= params.max_sample_failures {
                    return Err(PlannerError::SamplingFailed(failures));
                }
                continue;
            }
        };

        let (tree_a, tree_b) = pair_mut(trees, active);
        let reached_a = match tree_a.extend(ctx, &sample, false) {
            (ExtendStatus::Failed, _) | (_, None) => continue,
            (_, Some(index)) => index,
        };

        let target = tree_a.get_config(reached_a).clone();
        if let (ExtendStatus::Connected, Some(reached_b)) = tree_b.extend(ctx, &target, false) {
            let bridge = tree_b.get_config(reached_b);
            if ctx.in_collision(&target, bridge) {
                debug!("trees within reach but bridge segment blocked");
            } else {
                info!(
                    "Trees connected after {} iterations ({} + {} nodes)",
                    iteration,
                    tree_a.len(),
                    tree_b.len()
                );
                let meeting = if active == START_TREE {
                    Meeting {
                        start_index: reached_a,
                        goal_index: reached_b,
                    }
                } else {
                    Meeting {
                        start_index: reached_b,
                        goal_index: reached_a,
                    }
                };
                return Ok(meeting);
            }
        }

        active = 1 - active;
    }

    error!("Trees not connected after {} iterations", params.max_iterations);
    Err(PlannerError::IterationLimit(params.max_iterations))
}

/// Start root to meeting point along the start tree, then meeting point to
/// goal root along the goal tree
fn trace_path(trees: &[SpatialTree; 2], meeting: Meeting, params: &PlannerParams) -> Vec<Configuration> {
    let start_tree = &trees[START_TREE];
    let goal_tree = &trees[GOAL_TREE];

    let mut path: Vec<Configuration> = start_tree
        .trace_to_root(meeting.start_index)
        .into_iter()
        .rev()
        .map(|i| start_tree.get_config(i).clone())
        .collect();

    let mut goal_chain = goal_tree.trace_to_root(meeting.goal_index).into_iter();
    if let Some(meet) = goal_chain.next() {
        let q = goal_tree.get_config(meet);
        // skip an exact duplicate of the start-side meeting node
        if path.last().map_or(true, |last| params.distance(last, q) > 0.0) {
            path.push(q.clone());
        }
    }
    path.extend(goal_chain.map(|i| goal_tree.get_config(i).clone()));
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config_from_slice;
    use crate::environment::PointRobot;
    use crate::utils::RandomSampler;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn robot() -> Arc<Mutex<PointRobot>> {
        Arc::new(Mutex::new(PointRobot::new(&[0.0, 0.0], &[10.0, 10.0])))
    }

    fn params() -> PlannerParams {
        PlannerParams::new(config_from_slice(&[1.0, 1.0]), config_from_slice(&[9.0, 9.0]))
            .with_step_length(0.5)
            .with_max_iterations(2000)
    }

    fn free(_: &Configuration, _: &Configuration) -> bool {
        false
    }

    #[test]
    fn test_connects_in_free_space() {
        let sampler = RandomSampler::seeded(&[0.0, 0.0], &[10.0, 10.0], 1);
        let mut planner = TreePlanner::new(free, sampler);
        planner.init_plan(robot(), params()).unwrap();

        let mut traj = Trajectory::new();
        planner.plan_path(&mut traj).unwrap();
        assert_eq!(traj.first(), Some(&config_from_slice(&[1.0, 1.0])));
        assert_eq!(traj.last(), Some(&config_from_slice(&[9.0, 9.0])));
        for pair in traj.points().windows(2) {
            assert!((&pair[1] - &pair[0]).norm() <= 0.5 + 1e-9);
        }
        assert!(planner.iterations() >= 1);
    }

    #[test]
    fn test_blocked_everywhere_hits_iteration_limit() {
        let sampler = RandomSampler::seeded(&[0.0, 0.0], &[10.0, 10.0], 2);
        let blocked = |_: &Configuration, _: &Configuration| true;
        let mut planner = TreePlanner::new(blocked, sampler);
        planner
            .init_plan(robot(), params().with_max_iterations(50))
            .unwrap();

        let mut traj = Trajectory::new();
        let err = planner.plan_path(&mut traj).unwrap_err();
        assert!(matches!(err, PlannerError::IterationLimit(50)));
        assert_eq!(planner.iterations(), 50);
        assert!(traj.is_empty());
        let (start_tree, goal_tree) = planner.trees().unwrap();
        assert_eq!((start_tree.len(), goal_tree.len()), (1, 1));
    }

    #[test]
    fn test_iterations_reflect_failed_run() {
        let blocked = Rc::new(Cell::new(false));
        let toggle = blocked.clone();
        let checker = move |_: &Configuration, _: &Configuration| toggle.get();
        let sampler = RandomSampler::seeded(&[0.0, 0.0], &[10.0, 10.0], 1);
        let mut planner = TreePlanner::new(checker, sampler);
        planner.init_plan(robot(), params()).unwrap();

        let mut traj = Trajectory::new();
        planner.plan_path(&mut traj).unwrap();
        assert!(planner.iterations() >= 1);

        blocked.set(true);
        planner
            .init_plan(robot(), params().with_max_iterations(3))
            .unwrap();
        let mut traj = Trajectory::new();
        assert!(matches!(
            planner.plan_path(&mut traj),
            Err(PlannerError::IterationLimit(3))
        ));
        assert_eq!(planner.iterations(), 3);
    }

    #[test]
    fn test_iterations_counted_when_sampler_fails() {
        let mut planner = TreePlanner::new(free, || -> Option<Configuration> { None });
        planner
            .init_plan(robot(), params().with_max_sample_failures(5))
            .unwrap();
        let mut traj = Trajectory::new();
        assert!(matches!(
            planner.plan_path(&mut traj),
            Err(PlannerError::SamplingFailed(5))
        ));
        assert_eq!(planner.iterations(), 5);
    }

    #[test]
    fn test_goal_dof_mismatch() {
        let sampler = RandomSampler::seeded(&[0.0, 0.0], &[10.0, 10.0], 3);
        let mut planner = TreePlanner::new(free, sampler);
        let mut p = params();
        p.goal = config_from_slice(&[9.0]);
        planner.init_plan(robot(), p).unwrap();

        let mut traj = Trajectory::new();
        let err = planner.plan_path(&mut traj).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::InvalidConfiguration { which: "goal", expected: 2, actual: 1 }
        ));
    }

    #[test]
    fn test_trace_path_joins_both_chains() {
        let metric = crate::common::euclidean();
        let mut start_tree = SpatialTree::with_root(config_from_slice(&[0.0]), 1.0, metric.clone());
        let s1 = start_tree.add_node(Some(0), config_from_slice(&[1.0]));
        let mut goal_tree = SpatialTree::with_root(config_from_slice(&[3.0]), 1.0, metric);
        let g1 = goal_tree.add_node(Some(0), config_from_slice(&[2.0]));
        let g2 = goal_tree.add_node(Some(g1), config_from_slice(&[1.0]));

        let trees = [start_tree, goal_tree];
        let path = trace_path(
            &trees,
            Meeting {
                start_index: s1,
                goal_index: g2,
            },
            &PlannerParams::default(),
        );
        let xs: Vec<f64> = path.iter().map(|q| q[0]).collect();
        // the duplicated meeting configuration appears once
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
        assert_relative_eq!(xs[3], 3.0);
    }
}
