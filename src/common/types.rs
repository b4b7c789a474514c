//! Common types used throughout cspace_planning

use itertools::Itertools;
use nalgebra::DVector;

use crate::common::metric::DistanceMetric;

/// A point in configuration space: one value per active degree of freedom.
pub type Configuration = DVector<f64>;

/// Build a configuration from a slice of joint values
pub fn config_from_slice(values: &[f64]) -> Configuration {
    DVector::from_row_slice(values)
}

/// Which endpoints of a segment take part in a collision check.
///
/// `OpenStart` skips the first endpoint, which lets callers avoid re-checking
/// a configuration that is already stored in a roadmap or tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalType {
    /// Both endpoints excluded
    Open,
    /// First endpoint excluded
    OpenStart,
    /// Last endpoint excluded
    OpenEnd,
    /// Both endpoints included
    Closed,
}

impl IntervalType {
    pub fn includes_start(&self) -> bool {
        matches!(self, IntervalType::Closed | IntervalType::OpenEnd)
    }

    pub fn includes_end(&self) -> bool {
        matches!(self, IntervalType::Closed | IntervalType::OpenStart)
    }
}

/// Planner output: an append-only sequence of configurations, start to goal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    points: Vec<Configuration>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn add_point(&mut self, q: Configuration) {
        self.points.push(q);
    }

    pub fn points(&self) -> &[Configuration] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Configuration> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Configuration> {
        self.points.last()
    }

    /// Sum of metric distances between consecutive points
    pub fn total_length(&self, metric: &dyn DistanceMetric) -> f64 {
        self.points
            .iter()
            .tuple_windows()
            .map(|(a, b)| metric.eval(a, b))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::metric::Euclidean;
    use approx::assert_relative_eq;

    #[test]
    fn test_trajectory_total_length() {
        let mut traj = Trajectory::new();
        traj.add_point(config_from_slice(&[0.0, 0.0]));
        traj.add_point(config_from_slice(&[3.0, 4.0]));
        traj.add_point(config_from_slice(&[3.0, 5.0]));
        assert_eq!(traj.len(), 3);
        assert_relative_eq!(traj.total_length(&Euclidean), 6.0, epsilon = 1e-10);
    }

    #[test]
    fn test_interval_endpoints() {
        assert!(!IntervalType::OpenStart.includes_start());
        assert!(IntervalType::OpenStart.includes_end());
        assert!(IntervalType::Closed.includes_start());
        assert!(!IntervalType::Open.includes_end());
    }
}
