// Sampling-based trajectory generation module

pub mod kd_tree;
pub mod segment_index;
pub mod sampler;
pub mod rrt;
pub mod registry;

pub use kd_tree::*;
pub use segment_index::*;
pub use sampler::*;
pub use rrt::*;
pub use registry::*;
