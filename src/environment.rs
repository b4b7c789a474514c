//! A small planar world for exercising the planners: a point robot with
//! joint limits moving among circular obstacles.

use log::debug;

use crate::common::{CollisionChecker, Configuration, IntervalType, Robot};
use crate::path_planning::params::PlannerParams;

/// N-DOF point robot with box joint limits
#[derive(Debug, Clone)]
pub struct PointRobot {
    q: Configuration,
    lower: Configuration,
    upper: Configuration,
}

impl PointRobot {
    /// Robot at the lower limit corner
    pub fn new(lower: &[f64], upper: &[f64]) -> Self {
        assert_eq!(lower.len(), upper.len());
        let lower = Configuration::from_row_slice(lower);
        let upper = Configuration::from_row_slice(upper);
        PointRobot {
            q: lower.clone(),
            lower,
            upper,
        }
    }

    pub fn within_limits(&self, q: &Configuration) -> bool {
        q.len() == self.q.len()
            && q.iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(v, (lo, hi))| v >= lo && v <= hi)
    }

    pub fn lower_limits(&self) -> &Configuration {
        &self.lower
    }

    pub fn upper_limits(&self) -> &Configuration {
        &self.upper
    }
}

impl Robot for PointRobot {
    fn active_dof(&self) -> usize {
        self.q.len()
    }

    fn active_dof_values(&self) -> Configuration {
        self.q.clone()
    }

    fn set_active_dof_values(&mut self, q: &Configuration) {
        self.q = q.clone();
    }
}

/// Circular obstacle (x, y, radius)
#[derive(Debug, Clone)]
pub struct CircleObstacle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl CircleObstacle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }
}

/// Obstacles over the first two joints; segments are checked at a fixed
/// resolution. Configurations with fewer than two joints are never free.
#[derive(Debug, Clone)]
pub struct CircleWorld {
    pub obstacles: Vec<CircleObstacle>,
    pub robot_radius: f64,
    pub resolution: f64,
}

impl CircleWorld {
    pub fn new(obstacles: Vec<CircleObstacle>, robot_radius: f64, resolution: f64) -> Self {
        CircleWorld {
            obstacles,
            robot_radius,
            resolution,
        }
    }

    pub fn is_free(&self, q: &Configuration) -> bool {
        if q.len() < 2 {
            debug!("{}-DOF configuration cannot be placed in a planar world", q.len());
            return false;
        }
        self.obstacles.iter().all(|obs| {
            let dx = obs.x - q[0];
            let dy = obs.y - q[1];
            (dx * dx + dy * dy).sqrt() > obs.radius + self.robot_radius
        })
    }

    /// True if any checked point of `a -> b` touches an obstacle
    pub fn segment_in_collision(&self, a: &Configuration, b: &Configuration, interval: IntervalType) -> bool {
        let d = (b - a).norm();
        let n_steps = ((d / self.resolution).ceil() as usize).max(1);

        let first = if interval.includes_start() { 0 } else { 1 };
        let last = if interval.includes_end() { n_steps } else { n_steps - 1 };

        (first..=last).any(|i| {
            let t = i as f64 / n_steps as f64;
            !self.is_free(&a.lerp(b, t))
        })
    }
}

impl<R: Robot> CollisionChecker<R> for CircleWorld {
    fn check_collision(
        &self,
        _params: &PlannerParams,
        _robot: &R,
        a: &Configuration,
        b: &Configuration,
        interval: IntervalType,
    ) -> bool {
        self.segment_in_collision(a, b, interval)
    }
}
