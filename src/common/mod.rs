//! Common types, traits, and error definitions for cspace_planning
//!
//! This module provides the foundational building blocks shared by the
//! spatial structures and the planners.

pub mod types;
pub mod traits;
pub mod error;
pub mod metric;

pub use types::*;
pub use traits::*;
pub use error::*;
pub use metric::*;
