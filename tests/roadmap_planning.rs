use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;
use cspace_planning::common::{config_from_slice, Euclidean};
use cspace_planning::environment::PointRobot;
use cspace_planning::utils::RandomSampler;
use cspace_planning::{
    Configuration, MotionPlanner, PlannerError, PlannerParams, RoadmapPlanner, SpatialGraph,
    Trajectory,
};

const THRESHOLD: f64 = 5.0;

fn robot() -> Arc<Mutex<PointRobot>> {
    Arc::new(Mutex::new(PointRobot::new(&[0.0, 0.0], &[10.0, 10.0])))
}

fn params() -> PlannerParams {
    PlannerParams::new(config_from_slice(&[0.0, 0.0]), config_from_slice(&[10.0, 10.0]))
        .with_node_budget(20)
        .with_neighbor_threshold(THRESHOLD)
}

/// Twenty fixed samples spread over [0, 10] x [0, 10], none on x = 5
fn scattered_samples() -> impl FnMut() -> Option<Configuration> {
    let xs = [1.0, 3.0, 4.5, 6.5, 9.0];
    let ys = [1.0, 4.0, 6.5, 9.0];
    let mut points = xs
        .iter()
        .flat_map(|&x| ys.iter().map(move |&y| config_from_slice(&[x, y])))
        .collect::<Vec<_>>()
        .into_iter();
    move || points.next()
}

fn assert_steps_within_threshold(trajectory: &Trajectory) {
    for pair in trajectory.points().windows(2) {
        assert!((&pair[1] - &pair[0]).norm() <= THRESHOLD);
    }
}

#[test]
fn test_open_space_plan_reaches_goal() {
    let always_free = |_: &Configuration, _: &Configuration| false;
    let mut planner = RoadmapPlanner::new(always_free, scattered_samples());
    planner.init_plan(robot(), params()).unwrap();

    let mut trajectory = Trajectory::new();
    planner.plan_path(&mut trajectory).unwrap();

    let start = config_from_slice(&[0.0, 0.0]);
    let goal = config_from_slice(&[10.0, 10.0]);
    assert!(trajectory.len() >= 3);
    assert_relative_eq!((trajectory.first().unwrap() - &start).norm(), 0.0);
    assert_relative_eq!((trajectory.last().unwrap() - &goal).norm(), 0.0);
    assert_steps_within_threshold(&trajectory);
    assert!(trajectory.total_length(&Euclidean) >= (goal - start).norm());
}

#[test]
fn test_wall_at_x5_reports_no_path() {
    let crosses_wall = |a: &Configuration, b: &Configuration| (a[0] - 5.0) * (b[0] - 5.0) < 0.0;
    let mut planner = RoadmapPlanner::new(crosses_wall, scattered_samples());
    planner.init_plan(robot(), params()).unwrap();

    let mut trajectory = Trajectory::new();
    let err = planner.plan_path(&mut trajectory).unwrap_err();
    assert!(matches!(err, PlannerError::NoPath));
    assert!(err.is_connectivity_failure());
    assert!(trajectory.is_empty());

    for (u, v, _) in planner.roadmap().edges() {
        let (a, b) = (&planner.roadmap().nodes()[u].config, &planner.roadmap().nodes()[v].config);
        assert!(!crosses_wall(a, b));
    }
}

#[test]
fn test_random_roadmap_plan() {
    let always_free = |_: &Configuration, _: &Configuration| false;
    let sampler = RandomSampler::seeded(&[0.0, 0.0], &[10.0, 10.0], 11);
    let mut planner = RoadmapPlanner::new(always_free, sampler);
    planner
        .init_plan(robot(), params().with_node_budget(200))
        .unwrap();

    let mut trajectory = Trajectory::new();
    planner.plan_path(&mut trajectory).unwrap();
    assert_eq!(trajectory.first(), Some(&config_from_slice(&[0.0, 0.0])));
    assert_eq!(trajectory.last(), Some(&config_from_slice(&[10.0, 10.0])));
    assert_steps_within_threshold(&trajectory);
    assert_eq!(planner.roadmap().node_count(), 200);
}

#[test]
fn test_twenty_random_samples_open_space() {
    let start = config_from_slice(&[0.0, 0.0]);
    let goal = config_from_slice(&[10.0, 10.0]);
    let mut solved = 0;

    for seed in 0..20 {
        let always_free = |_: &Configuration, _: &Configuration| false;
        let sampler = RandomSampler::seeded(&[0.0, 0.0], &[10.0, 10.0], seed);
        let mut planner = RoadmapPlanner::new(always_free, sampler);
        planner.init_plan(robot(), params()).unwrap();
        assert_eq!(planner.roadmap().node_count(), 20);

        let mut trajectory = Trajectory::new();
        match planner.plan_path(&mut trajectory) {
            Ok(()) => {
                solved += 1;
                assert_relative_eq!((trajectory.first().unwrap() - &start).norm(), 0.0);
                assert_relative_eq!((trajectory.last().unwrap() - &goal).norm(), 0.0);
                assert_steps_within_threshold(&trajectory);
            }
            // an unlucky draw may leave a corner or a component unreachable
            Err(e) => {
                assert!(e.is_connectivity_failure());
                assert!(trajectory.is_empty());
            }
        }
        assert_eq!(planner.roadmap().node_count(), 20);
    }

    assert!(solved > 0);
}

#[test]
fn test_roadmap_is_reused_across_queries() {
    let always_free = |_: &Configuration, _: &Configuration| false;
    let mut planner = RoadmapPlanner::new(always_free, scattered_samples());
    planner.init_plan(robot(), params()).unwrap();

    let mut first = Trajectory::new();
    planner.plan_path(&mut first).unwrap();
    let mut second = Trajectory::new();
    planner.plan_path(&mut second).unwrap();

    assert_eq!(first, second);
    assert_eq!(planner.roadmap().node_count(), 20);
    assert_eq!(planner.parameters().map(|p| p.dof), Some(2));
}

#[test]
fn test_roadmap_dump_is_written() {
    let path = std::env::temp_dir().join(format!("cspace_roadmap_{}.dot", std::process::id()));
    let always_free = |_: &Configuration, _: &Configuration| false;
    let mut planner = RoadmapPlanner::new(always_free, scattered_samples());
    planner
        .init_plan(robot(), params().with_roadmap_dump(&path))
        .unwrap();

    let dot = std::fs::read_to_string(&path).unwrap();
    assert!(dot.starts_with("graph G {"));
    assert_eq!(dot.matches("--").count(), planner.roadmap().edge_count());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_three_node_chain_search() {
    let mut graph = SpatialGraph::new(3, THRESHOLD);
    let a = graph.add_node(config_from_slice(&[0.0, 0.0]));
    let b = graph.add_node(config_from_slice(&[3.0, 4.0]));
    let c = graph.add_node(config_from_slice(&[6.0, 8.0]));
    for &(u, v) in &[(a, b), (b, c), (a, c)] {
        graph.add_edge(u, v);
    }
    assert_eq!(graph.edge_count(), 2);

    for path in [graph.find_path_dijkstra(a, c), graph.find_path_astar(a, c)].iter() {
        let path = path.as_ref().unwrap();
        let ids: Vec<usize> = path.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert_relative_eq!(graph.path_cost(path).unwrap(), 10.0, epsilon = 1e-10);
    }
}
