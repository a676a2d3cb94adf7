//! Trajectory segment, one node of the trajectory tree

use std::cmp::Ordering;
use std::fmt;

use nalgebra::Vector3;
use ordered_float::OrderedFloat;

use crate::common::{TrajectoryInfo, TrajectoryPoint};

/// Stable handle of a segment inside a [`TrajectoryTree`](super::TrajectoryTree).
///
/// The generation changes whenever the slot is recycled, so a handle to a
/// destroyed segment never aliases a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// A timed motion primitive together with its evaluation scores
#[derive(Debug, Default)]
pub struct TrajectorySegment {
    /// Timed poses in temporal order
    pub trajectory: Vec<TrajectoryPoint>,
    pub gain: f64,
    pub cost: f64,
    /// Comparison key, larger is better
    pub value: f64,
    /// Bookkeeping flag for generators, never interpreted by the tree
    pub visited: bool,
    pub info: Option<Box<dyn TrajectoryInfo>>,
    pub(crate) parent: Option<SegmentId>,
    pub(crate) children: Vec<SegmentId>,
}

impl TrajectorySegment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trajectory(trajectory: Vec<TrajectoryPoint>) -> Self {
        Self {
            trajectory,
            ..Default::default()
        }
    }

    /// Position of the last pose, `None` for an empty trajectory
    pub fn endpoint(&self) -> Option<Vector3<f64>> {
        self.trajectory.last().map(|p| p.position)
    }

    pub fn parent(&self) -> Option<SegmentId> {
        self.parent
    }

    pub fn children(&self) -> &[SegmentId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Total order by ascending `value`; NaN sorts above every number.
    pub fn compare(a: &TrajectorySegment, b: &TrajectorySegment) -> Ordering {
        OrderedFloat(a.value).cmp(&OrderedFloat(b.value))
    }
}
