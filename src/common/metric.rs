//! Configuration-space distance metrics

use std::sync::Arc;

use crate::common::types::Configuration;

/// Distance between two configurations.
///
/// A* over the roadmap uses this as its heuristic, so it is only admissible
/// when the implementation satisfies the triangle inequality.
pub trait DistanceMetric {
    fn eval(&self, a: &Configuration, b: &Configuration) -> f64;
}

/// Metric shared between a planner's parameters and its spatial structures
pub type SharedMetric = Arc<dyn DistanceMetric + Send + Sync>;

/// Plain L2 distance over all joints
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl DistanceMetric for Euclidean {
    fn eval(&self, a: &Configuration, b: &Configuration) -> f64 {
        (a - b).norm()
    }
}

/// L2 distance with a per-joint weight, e.g. to favour moving distal joints
#[derive(Debug, Clone)]
pub struct WeightedEuclidean {
    weights: Configuration,
}

impl WeightedEuclidean {
    pub fn new(weights: Configuration) -> Self {
        Self { weights }
    }
}

impl DistanceMetric for WeightedEuclidean {
    fn eval(&self, a: &Configuration, b: &Configuration) -> f64 {
        (a - b).component_mul(&self.weights).norm()
    }
}

impl<F> DistanceMetric for F
where
    F: Fn(&Configuration, &Configuration) -> f64,
{
    fn eval(&self, a: &Configuration, b: &Configuration) -> f64 {
        self(a, b)
    }
}

pub fn euclidean() -> SharedMetric {
    Arc::new(Euclidean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::config_from_slice;
    use approx::assert_relative_eq;

    #[test]
    fn test_euclidean() {
        let a = config_from_slice(&[0.0, 0.0]);
        let b = config_from_slice(&[3.0, 4.0]);
        assert_relative_eq!(Euclidean.eval(&a, &b), 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_weighted_euclidean() {
        let metric = WeightedEuclidean::new(config_from_slice(&[1.0, 0.5]));
        let a = config_from_slice(&[0.0, 0.0]);
        let b = config_from_slice(&[3.0, 8.0]);
        assert_relative_eq!(metric.eval(&a, &b), 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_closure_metric() {
        let manhattan = |a: &Configuration, b: &Configuration| (a - b).abs().sum();
        let a = config_from_slice(&[0.0, 0.0]);
        let b = config_from_slice(&[3.0, -4.0]);
        assert_relative_eq!(manhattan.eval(&a, &b), 7.0, epsilon = 1e-10);
    }
}
