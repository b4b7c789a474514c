//! Visualization utilities for cspace_planning
//!
//! Plots the first two joints of roadmaps, trees and trajectories using
//! gnuplot. Only meaningful for planar problems, but handy for those.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{Configuration, Trajectory};
use crate::environment::CircleObstacle;
use crate::spatial::{SpatialGraph, SpatialTree};

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const GRAY: &str = "#808080";
    pub const LIGHT_GRAY: &str = "#C8C8C8";
    pub const ORANGE: &str = "#FFA500";
    pub const PURPLE: &str = "#800080";

    pub const OBSTACLE: &str = BLACK;
    pub const START: &str = GREEN;
    pub const GOAL: &str = BLUE;
    pub const PATH: &str = RED;
    pub const ROADMAP_EDGE: &str = LIGHT_GRAY;
    pub const ROADMAP_NODE: &str = GRAY;
    pub const START_TREE: &str = ORANGE;
    pub const GOAL_TREE: &str = PURPLE;
}

const CIRCLE_SEGMENTS: usize = 36;

/// Main visualizer struct
pub struct Visualizer {
    figure: Figure,
    title: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            title: String::new(),
            x_range: None,
            y_range: None,
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Roadmap edges as thin lines, nodes as dots
    pub fn plot_roadmap(&mut self, graph: &SpatialGraph) -> &mut Self {
        for (u, v, _) in graph.edges() {
            let (a, b) = (&graph.nodes()[u].config, &graph.nodes()[v].config);
            self.figure
                .axes2d()
                .lines(&[a[0], b[0]], &[a[1], b[1]], &[Color(colors::ROADMAP_EDGE)]);
        }

        let (x, y) = split_xy(graph.nodes().iter().map(|n| &n.config));
        self.figure.axes2d().points(
            &x,
            &y,
            &[
                Caption("Samples"),
                Color(colors::ROADMAP_NODE),
                PointSymbol('.'),
                PointSize(1.0),
            ],
        );
        self
    }

    /// Tree edges from each node to its parent
    pub fn plot_tree(&mut self, tree: &SpatialTree, color: &str) -> &mut Self {
        for node in tree.nodes() {
            if let Some(parent) = node.parent {
                let p = tree.get_config(parent);
                self.figure.axes2d().lines(
                    &[p[0], node.config[0]],
                    &[p[1], node.config[1]],
                    &[Color(color)],
                );
            }
        }
        self
    }

    pub fn plot_trajectory(&mut self, trajectory: &Trajectory) -> &mut Self {
        let (x, y) = split_xy(trajectory.points().iter());
        self.figure.axes2d().lines(
            &x,
            &y,
            &[Caption("Path"), Color(colors::PATH), LineWidth(2.0)],
        );
        self
    }

    /// Obstacle outlines, inflated by the robot radius
    pub fn plot_obstacles(&mut self, obstacles: &[CircleObstacle], robot_radius: f64) -> &mut Self {
        for obs in obstacles {
            let r = obs.radius + robot_radius;
            let (x, y): (Vec<f64>, Vec<f64>) = (0..=CIRCLE_SEGMENTS)
                .map(|i| {
                    let theta = 2.0 * std::f64::consts::PI * i as f64 / CIRCLE_SEGMENTS as f64;
                    (obs.x + r * theta.cos(), obs.y + r * theta.sin())
                })
                .unzip();
            self.figure
                .axes2d()
                .lines(&x, &y, &[Color(colors::OBSTACLE), LineWidth(1.5)]);
        }
        self
    }

    pub fn plot_start(&mut self, q: &Configuration) -> &mut Self {
        self.plot_marker(q, "Start", colors::START)
    }

    pub fn plot_goal(&mut self, q: &Configuration) -> &mut Self {
        self.plot_marker(q, "Goal", colors::GOAL)
    }

    fn plot_marker(&mut self, q: &Configuration, caption: &str, color: &str) -> &mut Self {
        self.figure.axes2d().points(
            &[q[0]],
            &[q[1]],
            &[Caption(caption), Color(color), PointSymbol('O'), PointSize(2.0)],
        );
        self
    }

    /// Finalize and show the plot
    pub fn show(&mut self) -> Result<(), String> {
        self.apply_settings();
        self.figure.show().map_err(|e| e.to_string()).map(|_| ())
    }

    /// Save plot to SVG file
    pub fn save_svg(&mut self, path: &str) -> Result<(), String> {
        self.apply_settings();
        self.figure.save_to_svg(path, 640, 480).map_err(|e| e.to_string())
    }

    fn apply_settings(&mut self) {
        let axes = self.figure.axes2d();

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label("q0", &[]);
        axes.set_y_label("q1", &[]);
        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        axes.set_aspect_ratio(AutoOption::Fix(1.0));
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

fn split_xy<'a, I>(configs: I) -> (Vec<f64>, Vec<f64>)
where
    I: Iterator<Item = &'a Configuration>,
{
    configs.map(|q| (q[0], q[1])).unzip()
}
