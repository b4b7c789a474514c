// Bidirectional RRT planning for a point robot among circles

use std::sync::{Arc, Mutex};

use cspace_planning::common::config_from_slice;
use cspace_planning::environment::{CircleObstacle, CircleWorld, PointRobot};
use cspace_planning::utils::{colors, RandomSampler, Visualizer};
use cspace_planning::{MotionPlanner, PlannerParams, TreePlanner, Trajectory};

const SHOW_ANIMATION: bool = true;
const ROBOT_RADIUS: f64 = 0.3;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    println!("Bidirectional RRT path planning start!");

    let obstacles = vec![
        CircleObstacle::new(5.0, 5.0, 2.0),
        CircleObstacle::new(2.5, 7.0, 1.0),
        CircleObstacle::new(7.5, 3.0, 1.0),
    ];
    let world = CircleWorld::new(obstacles.clone(), ROBOT_RADIUS, 0.05);
    let robot = Arc::new(Mutex::new(PointRobot::new(&[0.0, 0.0], &[10.0, 10.0])));
    let sampler = RandomSampler::new(&[0.0, 0.0], &[10.0, 10.0]);

    let start = config_from_slice(&[1.0, 1.0]);
    let goal = config_from_slice(&[9.0, 9.0]);
    let params = PlannerParams::new(start.clone(), goal.clone())
        .with_step_length(0.25)
        .with_max_iterations(5000);

    let mut planner = TreePlanner::new(world, sampler);
    if let Err(e) = planner.init_plan(robot, params) {
        println!("Initialization failed: {}", e);
        return;
    }

    let mut trajectory = Trajectory::new();
    let result = planner.plan_path(&mut trajectory);

    let mut vis = Visualizer::new();
    vis.set_title("Bidirectional RRT")
        .set_x_range(0.0, 10.0)
        .set_y_range(0.0, 10.0);
    if let Some((start_tree, goal_tree)) = planner.trees() {
        vis.plot_tree(start_tree, colors::START_TREE)
            .plot_tree(goal_tree, colors::GOAL_TREE);
    }
    vis.plot_obstacles(&obstacles, ROBOT_RADIUS)
        .plot_start(&start)
        .plot_goal(&goal);

    match result {
        Ok(()) => {
            println!(
                "Path found with {} points after {} iterations",
                trajectory.len(),
                planner.iterations()
            );
            vis.plot_trajectory(&trajectory);
        }
        Err(e) => println!("{}", e),
    }

    if SHOW_ANIMATION {
        if let Err(e) = vis.show() {
            println!("Could not show plot: {}", e);
        }
    }
    if let Err(e) = vis.save_svg("./img/path_planning/bi_rrt_cspace.svg") {
        println!("Could not save plot: {}", e);
    }

    println!("Done!");
}
