//! Common traits defining the seams between the planner core and its collaborators

use std::any::Any;
use std::fmt;

use nalgebra::Vector3;

use crate::trajectory_tree::{SegmentId, TrajectoryTree};

/// Point-wise free-space query answered by the environment map
pub trait TraversabilityOracle: Send + Sync {
    /// Whether the vehicle may occupy `point`
    fn is_traversable(&self, point: &Vector3<f64>) -> bool;

    /// Map resolution [m], used to discretize collision checks
    fn resolution(&self) -> f64;
}

/// Evaluator-defined payload carried by a segment.
///
/// The planner core only stores it; evaluators downcast through `as_any`.
pub trait TrajectoryInfo: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Trait for trajectory generators growing a trajectory tree
pub trait TrajectoryGenerator: Send {
    /// Name the generator is registered under
    fn name(&self) -> &str;

    /// Pick the segment to expand next, or `None` if nothing suitable was found
    fn select_segment(&mut self, tree: &TrajectoryTree) -> Option<SegmentId>;

    /// Expand `target`, pushing every created segment onto `new_segments`.
    ///
    /// Returns `false` when no segment was created.
    fn expand_segment(
        &mut self,
        tree: &mut TrajectoryTree,
        target: Option<SegmentId>,
        new_segments: &mut Vec<SegmentId>,
    ) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct VisibleVoxels(usize);

    impl TrajectoryInfo for VisibleVoxels {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_trajectory_info_downcast() {
        let mut info: Box<dyn TrajectoryInfo> = Box::new(VisibleVoxels(12));
        assert_eq!(info.as_any().downcast_ref::<VisibleVoxels>().map(|v| v.0), Some(12));
        if let Some(v) = info.as_any_mut().downcast_mut::<VisibleVoxels>() {
            v.0 += 1;
        }
        assert_eq!(info.as_any().downcast_ref::<VisibleVoxels>().map(|v| v.0), Some(13));
        assert!(info.as_any().downcast_ref::<u32>().is_none());
    }
}
