//! Utility modules for cspace_planning

pub mod graphviz;
pub mod sampler;
pub mod visualization;

pub use sampler::{RandomSampler, RejectionSampler};
pub use visualization::{colors, Visualizer};
