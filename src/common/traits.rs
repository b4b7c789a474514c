//! Common traits defining the collaborators a planner talks to

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use crate::common::error::PlannerResult;
use crate::common::types::{Configuration, IntervalType, Trajectory};
use crate::path_planning::params::PlannerParams;

/// The robot being planned for, seen through its active DOF
pub trait Robot {
    /// Number of active degrees of freedom
    fn active_dof(&self) -> usize;

    /// Current values of the active joints
    fn active_dof_values(&self) -> Configuration;

    /// Move the active joints
    fn set_active_dof_values(&mut self, q: &Configuration);
}

/// Saves the robot's active joint values and restores them when dropped
pub struct RobotStateSaver<'a, R: Robot> {
    robot: &'a mut R,
    saved: Configuration,
}

impl<'a, R: Robot> RobotStateSaver<'a, R> {
    pub fn new(robot: &'a mut R) -> Self {
        let saved = robot.active_dof_values();
        Self { robot, saved }
    }
}

impl<'a, R: Robot> Deref for RobotStateSaver<'a, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.robot
    }
}

impl<'a, R: Robot> DerefMut for RobotStateSaver<'a, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.robot
    }
}

impl<'a, R: Robot> Drop for RobotStateSaver<'a, R> {
    fn drop(&mut self) {
        self.robot.set_active_dof_values(&self.saved);
    }
}

/// Collision oracle for straight segments in configuration space
pub trait CollisionChecker<R: Robot> {
    /// Returns true if the segment `a -> b` is in collision
    fn check_collision(
        &self,
        params: &PlannerParams,
        robot: &R,
        a: &Configuration,
        b: &Configuration,
        interval: IntervalType,
    ) -> bool;
}

impl<R, F> CollisionChecker<R> for F
where
    R: Robot,
    F: Fn(&Configuration, &Configuration) -> bool,
{
    fn check_collision(
        &self,
        _params: &PlannerParams,
        _robot: &R,
        a: &Configuration,
        b: &Configuration,
        _interval: IntervalType,
    ) -> bool {
        self(a, b)
    }
}

/// Source of random configurations
pub trait Sampler {
    /// Draw one sample; `None` marks a failed attempt
    fn gen_single_sample(&mut self) -> Option<Configuration>;
}

impl<F> Sampler for F
where
    F: FnMut() -> Option<Configuration>,
{
    fn gen_single_sample(&mut self) -> Option<Configuration> {
        self()
    }
}

/// Trait for configuration-space motion planners
pub trait MotionPlanner<R: Robot> {
    /// Bind the planner to a robot and a parameter set, doing any
    /// precomputation that does not depend on start/goal
    fn init_plan(&mut self, robot: Arc<Mutex<R>>, params: PlannerParams) -> PlannerResult<()>;

    /// Plan from `params.start` to `params.goal`, appending the path to
    /// `trajectory`. Nothing is appended on failure.
    fn plan_path(&mut self, trajectory: &mut Trajectory) -> PlannerResult<()>;

    /// Parameters given to the last successful `init_plan`
    fn parameters(&self) -> Option<&PlannerParams>;
}
