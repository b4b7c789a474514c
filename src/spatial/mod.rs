//! Spatial representations built during planning: a roadmap graph and a
//! growable tree. Both are arena-backed and append-only.

pub mod graph;
pub mod tree;

pub use graph::{GraphNode, NodeId, SpatialGraph};
pub use tree::{ExtendStatus, SpatialTree, TreeContext, TreeNode};
