//! cspace_planning - sampling-based motion planning in configuration space
//!
//! This crate provides a roadmap planner (PRM) and a bidirectional tree
//! planner over arbitrary-DOF configurations, built on two spatial
//! structures: an undirected roadmap graph and a growable tree.
//!
//! The robot, collision checker and sampler are supplied by the caller
//! through the traits in [`common`].

// Core modules
pub mod common;
pub mod spatial;
pub mod utils;

// Planners
pub mod path_planning;

// Reference environment
pub mod environment;

// Re-export common types for convenience
pub use common::{Configuration, IntervalType, Trajectory};
pub use common::{CollisionChecker, MotionPlanner, Robot, Sampler};
pub use common::{PlannerError, PlannerResult};
pub use path_planning::{PlannerParams, RoadmapPlanner, TreePlanner};
pub use spatial::{ExtendStatus, SpatialGraph, SpatialTree};
