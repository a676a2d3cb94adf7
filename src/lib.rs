//! exploration_planner - online trajectory-tree planner for 3D exploration
//!
//! This crate grows a tree of candidate trajectories rooted at the vehicle's
//! current state, using RRT expansion accelerated by an incremental kd-tree
//! over segment endpoints.

// Core modules
pub mod common;
pub mod trajectory_tree;

// Algorithm modules
pub mod path_planning;
pub mod mapping;

// Re-export common types for convenience
pub use common::{BoundingVolume, TrajectoryPoint};
pub use common::{TrajectoryGenerator, TrajectoryInfo, TraversabilityOracle};
pub use common::{PlannerError, PlannerResult};
pub use trajectory_tree::{SegmentId, TrajectorySegment, TrajectoryTree};
