//! Trajectory Tree
//!
//! Ownership and traversal structure over trajectory segments. The tree is
//! rooted at the vehicle's current commit point and grown by trajectory
//! generators through [`TrajectoryTree::spawn_child`].
//!
//! # Components
//!
//! - `segment`: a single timed motion primitive with its scores and payload
//! - `tree`: arena ownership, traversal, pruning and rerooting

pub mod segment;
pub mod tree;

pub use segment::{SegmentId, TrajectorySegment};
pub use tree::{TreeStamp, TrajectoryTree};
