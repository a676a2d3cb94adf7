//! Nearest-segment index over trajectory tree endpoints
//!
//! Keeps the endpoint of every indexed segment in a kd-tree, with the segment
//! ids stored in a parallel vector in the same order. The index is tied to one
//! revision of one tree: after the tree is rerooted, reset or pruned it must be
//! rebuilt before the next query.

use log::debug;
use nalgebra::Vector3;

use crate::trajectory_tree::{TreeStamp, SegmentId, TrajectoryTree};

use super::kd_tree::KdTree;

#[derive(Debug, Default)]
pub struct SegmentIndex {
    kd_tree: KdTree,
    segments: Vec<SegmentId>,
    stamp: Option<TreeStamp>,
}

impl SegmentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every segment reachable from the root of `tree`.
    ///
    /// Segments without poses have no endpoint and are skipped. Returns the
    /// number of indexed segments.
    pub fn rebuild(&mut self, tree: &TrajectoryTree) -> usize {
        self.segments.clear();
        let mut points = Vec::new();
        for id in tree.all_nodes(tree.root()) {
            if let Some(endpoint) = tree[id].endpoint() {
                points.push(endpoint);
                self.segments.push(id);
            }
        }
        self.kd_tree.build(points);
        self.stamp = Some(tree.stamp());
        debug!("rebuilt segment index with {} segments", self.segments.len());
        self.segments.len()
    }

    /// Add the endpoint of `id` without rebuilding.
    ///
    /// Returns `false` if `id` is stale or has no poses.
    pub fn insert(&mut self, tree: &TrajectoryTree, id: SegmentId) -> bool {
        match tree.get(id).and_then(|segment| segment.endpoint()) {
            Some(endpoint) => {
                self.kd_tree.insert(endpoint);
                self.segments.push(id);
                true
            }
            None => {
                debug!("segment {} has no endpoint, not indexed", id);
                false
            }
        }
    }

    /// Segment whose endpoint is closest to `point`
    pub fn nearest(&self, point: &Vector3<f64>) -> Option<SegmentId> {
        self.nearest_with_distance(point).map(|(id, _)| id)
    }

    /// Closest segment together with its Euclidean distance to `point`
    pub fn nearest_with_distance(&self, point: &Vector3<f64>) -> Option<(SegmentId, f64)> {
        self.kd_tree
            .nearest(point)
            .map(|(item, dist_sq)| (self.segments[item], dist_sq.sqrt()))
    }

    /// Whether the index was built against the current revision of `tree`
    pub fn is_current(&self, tree: &TrajectoryTree) -> bool {
        self.stamp == Some(tree.stamp())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.kd_tree.clear();
        self.segments.clear();
        self.stamp = None;
    }
}
