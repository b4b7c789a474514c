//! Probabilistic Road-Map (PRM) planning in configuration space
//!
//! `init_plan` samples the configured number of configurations and joins
//! every pair within the neighbor threshold whose segment is collision-free.
//! `plan_path` splices start and goal into that roadmap and searches it,
//! trying A* first and falling back to Dijkstra.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use log::{debug, error, info, warn};

use crate::common::{
    CollisionChecker, Configuration, IntervalType, MotionPlanner, PlannerError, PlannerResult,
    Robot, RobotStateSaver, Sampler, Trajectory,
};
use crate::path_planning::params::PlannerParams;
use crate::spatial::{GraphNode, NodeId, SpatialGraph};
use crate::utils::graphviz;

/// Roadmap planner over an external robot, collision checker and sampler
pub struct RoadmapPlanner<R, C, S> {
    checker: C,
    sampler: S,
    robot: Option<Arc<Mutex<R>>>,
    params: Option<PlannerParams>,
    roadmap: SpatialGraph,
}

impl<R, C, S> RoadmapPlanner<R, C, S>
where
    R: Robot,
    C: CollisionChecker<R>,
    S: Sampler,
{
    pub fn new(checker: C, sampler: S) -> Self {
        RoadmapPlanner {
            checker,
            sampler,
            robot: None,
            params: None,
            roadmap: SpatialGraph::default(),
        }
    }

    /// The roadmap built by `init_plan`. Start and goal nodes spliced in by
    /// `plan_path` are removed again before it returns.
    pub fn roadmap(&self) -> &SpatialGraph {
        &self.roadmap
    }
}

impl<R, C, S> MotionPlanner<R> for RoadmapPlanner<R, C, S>
where
    R: Robot,
    C: CollisionChecker<R>,
    S: Sampler,
{
    fn init_plan(&mut self, robot: Arc<Mutex<R>>, mut params: PlannerParams) -> PlannerResult<()> {
        info!("Initializing roadmap planner");
        params.validate()?;

        let nodes = {
            let mut guard = robot.lock().map_err(|_| PlannerError::EnvironmentLock)?;
            let robot_state = RobotStateSaver::new(&mut *guard);
            params.dof = robot_state.active_dof();

            // room for the samples plus a start and a goal
            self.roadmap = SpatialGraph::with_metric(
                params.node_budget + 2,
                params.neighbor_threshold,
                params.metric.clone(),
            );

            let samples = sample_configurations(&mut self.sampler, &params)?;
            connect_samples(&mut self.roadmap, &self.checker, &params, &*robot_state, samples)
        };

        if let Some(path) = &params.roadmap_dump {
            if let Err(e) = graphviz::save_graph(&self.roadmap, path) {
                warn!("could not write roadmap to {}: {}", path.display(), e);
            }
        }

        info!(
            "Roadmap planner initialized with [{}] nodes, [{}] edges",
            nodes,
            self.roadmap.edge_count()
        );
        self.robot = Some(robot);
        self.params = Some(params);
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

        // start and goal only live in the roadmap for this query
        let roadmap_len = self.roadmap.node_count();
        let result = splice_and_search(&mut self.roadmap, &self.checker, params, &*robot_state);
        self.roadmap.truncate(roadmap_len);
        let path = result?;

        for node in &path {
            trajectory.add_point(node.config.clone());
        }

        info!(
            "plan success, path={} points in {:.3}s",
            path.len(),
            base_time.elapsed().as_secs_f64()
        );
        Ok(())
    }

    fn parameters(&self) -> Option<&PlannerParams> {
        self.params.as_ref()
    }
}

/// Draw `node_budget` samples, retrying failed draws in place
fn sample_configurations<S: Sampler>(sampler: &mut S, params: &PlannerParams) -> PlannerResult<Vec<Configuration>> {
    let mut samples = Vec::with_capacity(params.node_budget);
    let mut failures = 0;

    while samples.len() < params.node_budget {
        match sampler.gen_single_sample() {
            Some(q) if q.len() == params.dof => {
                samples.push(q);
                failures = 0;
            }
            Some(q) => {
                warn!("Discarding sample with {} DOF, expected {}", q.len(), params.dof);
                failures += 1;
            }
            None => {
                warn!("Failed to get a sample");
                failures += 1;
            }
        }

        if failures >= params.max_sample_failures {
            return Err(PlannerError::SamplingFailed(failures));
        }
    }

    Ok(samples)
}

/// Insert each sample and join it to its collision-free neighbors.
/// Returns the node count afterwards.
fn connect_samples<R, C>(
    graph: &mut SpatialGraph,
    checker: &C,
    params: &PlannerParams,
    robot: &R,
    samples: Vec<Configuration>,
) -> usize
where
    R: Robot,
    C: CollisionChecker<R>,
{
    debug!("connecting samples");

    for q in samples {
        let v = graph.add_node(q);
        let neighbors = graph.find_nn(v);
        if neighbors.is_empty() {
            continue;
        }

        for neighbor in neighbors {
            if let Some(max_edges) = params.max_edges_per_node {
                if graph.neighbors(v).len() >= max_edges {
                    break;
                }
            }

            let q = &graph.nodes()[v].config;
            if checker.check_collision(params, robot, q, &neighbor.config, IntervalType::Open) {
                continue;
            }
            if !graph.add_edge(v, neighbor.id) {
                warn!("Failure in adding an edge ({}, {})", v, neighbor.id);
            }
        }
    }

    graph.node_count()
}

/// Splice start and goal into the roadmap and search between them
fn splice_and_search<R, C>(
    graph: &mut SpatialGraph,
    checker: &C,
    params: &PlannerParams,
    robot: &R,
) -> PlannerResult<Vec<GraphNode>>
where
    R: Robot,
    C: CollisionChecker<R>,
{
    let start = add_endpoint(graph, checker, params, robot, "start", &params.start)?;
    let goal = add_endpoint(graph, checker, params, robot, "goal", &params.goal)?;

    find_path(graph, start, goal).ok_or_else(|| {
        error!("No path found");
        PlannerError::NoPath
    })
}

/// Insert `config` and join it to the first neighbor with a collision-free
/// segment. The inserted node becomes the search endpoint.
fn add_endpoint<R, C>(
    graph: &mut SpatialGraph,
    checker: &C,
    params: &PlannerParams,
    robot: &R,
    which: &'static str,
    config: &Configuration,
) -> PlannerResult<NodeId>
where
    R: Robot,
    C: CollisionChecker<R>,
{
    if config.len() != robot.active_dof() {
        error!("Specified {} configuration is invalid", which);
        return Err(PlannerError::InvalidConfiguration {
            which,
            expected: robot.active_dof(),
            actual: config.len(),
        });
    }

    let id = graph.add_node(config.clone());
    let near_samples = graph.find_nn(id);
    info!("Getting near samples for {} [{}], neighbors [{}]", which, id, near_samples.len());

    if near_samples.is_empty() {
        warn!("{} node too far from the roadmap", which);
        return Err(PlannerError::Disconnected(format!(
            "{} configuration has no roadmap node within {}",
            which,
            graph.neighbor_threshold()
        )));
    }

    for neighbor in near_samples {
        if checker.check_collision(params, robot, &neighbor.config, config, IntervalType::Open) {
            continue;
        }
        if graph.add_edge(neighbor.id, id) {
            info!("Added the {} configuration", which);
            return Ok(id);
        }
    }

    error!("Added invalid {} configuration", which);
    Err(PlannerError::Disconnected(format!(
        "no collision-free segment from the {} configuration to the roadmap",
        which
    )))
}

/// A* first, Dijkstra if that comes back empty
fn find_path(graph: &SpatialGraph, start: NodeId, goal: NodeId) -> Option<Vec<GraphNode>> {
    if let Some(path) = graph.find_path_astar(start, goal) {
        debug!("Found goal with A*");
        return Some(path);
    }
    if let Some(path) = graph.find_path_dijkstra(start, goal) {
        debug!("Found goal with Dijkstra");
        return Some(path);
    }
    None
}
