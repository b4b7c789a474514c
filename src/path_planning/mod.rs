// Path Planning algorithms module

pub mod params;
pub mod prm;
pub mod bi_rrt;

pub use params::*;
pub use prm::*;
pub use bi_rrt::*;
