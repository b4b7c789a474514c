// Probabilistic Road-Map planning for a point robot among circles
//
// Run with RUST_LOG=info (or debug) to follow roadmap construction.

use std::sync::{Arc, Mutex};

use cspace_planning::common::config_from_slice;
use cspace_planning::environment::{CircleObstacle, CircleWorld, PointRobot};
use cspace_planning::utils::{RandomSampler, RejectionSampler, Visualizer};
use cspace_planning::{MotionPlanner, PlannerParams, RoadmapPlanner, Trajectory};

const SHOW_ANIMATION: bool = true;
const ROBOT_RADIUS: f64 = 0.3;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    println!("PRM path planning start!");

    let obstacles = vec![
        CircleObstacle::new(5.0, 5.0, 1.5),
        CircleObstacle::new(3.0, 7.5, 1.0),
        CircleObstacle::new(7.0, 2.5, 1.0),
    ];
    let world = CircleWorld::new(obstacles.clone(), ROBOT_RADIUS, 0.05);
    let robot = Arc::new(Mutex::new(PointRobot::new(&[0.0, 0.0], &[10.0, 10.0])));

    let free_space = world.clone();
    let sampler = RejectionSampler::new(
        RandomSampler::new(&[0.0, 0.0], &[10.0, 10.0]),
        move |q: &cspace_planning::Configuration| free_space.is_free(q),
    );

    let start = config_from_slice(&[0.5, 0.5]);
    let goal = config_from_slice(&[9.5, 9.5]);
    let params = PlannerParams::new(start.clone(), goal.clone())
        .with_node_budget(200)
        .with_neighbor_threshold(2.0)
        .with_roadmap_dump("prm_roadmap.dot");

    let mut planner = RoadmapPlanner::new(world, sampler);
    println!("Building road map...");
    if let Err(e) = planner.init_plan(robot, params) {
        println!("Roadmap construction failed: {}", e);
        return;
    }

    println!("Planning path...");
    let mut trajectory = Trajectory::new();
    let result = planner.plan_path(&mut trajectory);

    let mut vis = Visualizer::new();
    vis.set_title("PRM Path Planning")
        .set_x_range(0.0, 10.0)
        .set_y_range(0.0, 10.0);
    vis.plot_roadmap(planner.roadmap())
        .plot_obstacles(&obstacles, ROBOT_RADIUS)
        .plot_start(&start)
        .plot_goal(&goal);

    match result {
        Ok(()) => {
            println!("Path found with {} points", trajectory.len());
            vis.plot_trajectory(&trajectory);
        }
        Err(e) => println!("{}", e),
    }

    if SHOW_ANIMATION {
        if let Err(e) = vis.show() {
            println!("Could not show plot: {}", e);
        }
    }
    match vis.save_svg("./img/path_planning/prm_cspace.svg") {
        Ok(()) => println!("Plot saved to ./img/path_planning/prm_cspace.svg"),
        Err(e) => println!("Could not save plot: {}", e),
    }

    println!("Done!");
}
