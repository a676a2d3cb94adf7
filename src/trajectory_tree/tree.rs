//! Arena-backed trajectory tree
//!
//! All segments are owned by the tree. Each segment owns its children through
//! its `children` id list and refers back to its parent by id, so pruning a
//! branch or rerooting frees exactly the affected subtree.

use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::common::{PlannerError, PlannerResult, TrajectoryPoint};

use super::segment::{SegmentId, TrajectorySegment};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(0);

/// Structural revision of a specific tree instance.
///
/// Changes on every operation that destroys segments (reroot, reset, branch
/// pruning). Appending children keeps it. Equal stamps mean every id captured
/// by derived state built against the tree is still live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeStamp {
    tree: u64,
    revision: u64,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    segment: Option<TrajectorySegment>,
}

/// Rooted tree of trajectory segments
#[derive(Debug)]
pub struct TrajectoryTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: SegmentId,
    len: usize,
    id: u64,
    revision: u64,
}

impl TrajectoryTree {
    /// Create a tree whose root is `root`. Any linkage on `root` is discarded.
    pub fn new(root: TrajectorySegment) -> Self {
        let mut tree = TrajectoryTree {
            slots: Vec::new(),
            free: Vec::new(),
            root: SegmentId { index: 0, generation: 0 },
            len: 0,
            id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            revision: 0,
        };
        tree.root = tree.allocate(Self::detached(root));
        tree
    }

    /// Create a tree rooted at a single pose
    pub fn from_pose(pose: TrajectoryPoint) -> Self {
        Self::new(TrajectorySegment::with_trajectory(vec![pose]))
    }

    pub fn root(&self) -> SegmentId {
        self.root
    }

    pub fn stamp(&self) -> TreeStamp {
        TreeStamp {
            tree: self.id,
            revision: self.revision,
        }
    }

    /// Number of live segments, root included
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: SegmentId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: SegmentId) -> Option<&TrajectorySegment> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.segment.as_ref())
    }

    pub fn get_mut(&mut self, id: SegmentId) -> Option<&mut TrajectorySegment> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.segment.as_mut())
    }

    pub fn parent(&self, id: SegmentId) -> Option<SegmentId> {
        self.get(id).and_then(|segment| segment.parent)
    }

    /// Immediate children of `id` in creation order.
    ///
    /// # Panics
    /// If `id` is not a live segment of this tree.
    pub fn children(&self, id: SegmentId) -> &[SegmentId] {
        &self[id].children
    }

    /// Append a new empty child to `parent` and return its id.
    ///
    /// # Panics
    /// If `parent` is not a live segment of this tree.
    pub fn spawn_child(&mut self, parent: SegmentId) -> SegmentId {
        assert!(self.contains(parent), "stale segment id {} passed to spawn_child", parent);
        let child = self.allocate(TrajectorySegment {
            parent: Some(parent),
            ..Default::default()
        });
        self[parent].children.push(child);
        child
    }

    /// All segments without children in the subtree of `id`, depth first.
    ///
    /// # Panics
    /// If `id` is not a live segment of this tree.
    pub fn leaves(&self, id: SegmentId) -> Vec<SegmentId> {
        self.all_nodes(id)
            .into_iter()
            .filter(|&node| self[node].is_leaf())
            .collect()
    }

    /// `id` followed by all of its descendants in pre-order.
    ///
    /// # Panics
    /// If `id` is not a live segment of this tree.
    pub fn all_nodes(&self, id: SegmentId) -> Vec<SegmentId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(self[node].children.iter().rev());
        }
        result
    }

    /// Whether `id` lies in the subtree rooted at `ancestor` (inclusive)
    pub fn is_in_subtree(&self, ancestor: SegmentId, id: SegmentId) -> bool {
        let mut current = Some(id).filter(|&node| self.contains(node));
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Sort ids by ascending segment value
    pub fn sort_by_value(&self, ids: &mut [SegmentId]) {
        ids.sort_by(|&a, &b| TrajectorySegment::compare(&self[a], &self[b]));
    }

    /// Destroy `id` and its descendants. Returns the number of destroyed segments.
    pub fn remove_subtree(&mut self, id: SegmentId) -> PlannerResult<usize> {
        if !self.contains(id) {
            return Err(Self::invalid(id, "segment is not part of the tree"));
        }
        if id == self.root {
            return Err(Self::invalid(id, "cannot prune the root, use reset"));
        }
        if let Some(parent) = self.parent(id) {
            self[parent].children.retain(|&child| child != id);
        }
        let removed = self.release_subtree(id);
        self.revision += 1;
        debug!("pruned {} from tree {}: removed {} segments", id, self.id, removed);
        Ok(removed)
    }

    /// Make `new_root` the root, destroying every segment outside its subtree.
    ///
    /// Returns the number of destroyed segments.
    pub fn reroot(&mut self, new_root: SegmentId) -> PlannerResult<usize> {
        if !self.contains(new_root) {
            return Err(Self::invalid(new_root, "segment is not part of the tree"));
        }
        if new_root == self.root {
            return Ok(0);
        }
        if let Some(parent) = self.parent(new_root) {
            self[parent].children.retain(|&child| child != new_root);
        }
        self[new_root].parent = None;
        let old_root = self.root;
        let removed = self.release_subtree(old_root);
        self.root = new_root;
        self.revision += 1;
        debug!(
            "rerooted tree {} at {}: removed {} segments, {} remain",
            self.id, new_root, removed, self.len
        );
        Ok(removed)
    }

    /// Destroy the whole tree and install `root` as the new root
    pub fn reset(&mut self, root: TrajectorySegment) -> SegmentId {
        let removed = self.release_subtree(self.root);
        self.root = self.allocate(Self::detached(root));
        self.revision += 1;
        debug!("reset tree {}: removed {} segments", self.id, removed);
        self.root
    }

    fn detached(mut segment: TrajectorySegment) -> TrajectorySegment {
        segment.parent = None;
        segment.children.clear();
        segment
    }

    fn invalid(id: SegmentId, reason: &str) -> PlannerError {
        PlannerError::InvalidSegment {
            id,
            reason: reason.to_string(),
        }
    }

    fn allocate(&mut self, segment: TrajectorySegment) -> SegmentId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.segment = Some(segment);
            SegmentId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                segment: Some(segment),
            });
            SegmentId { index, generation: 0 }
        }
    }

    fn release_subtree(&mut self, id: SegmentId) -> usize {
        let nodes = self.all_nodes(id);
        for &node in &nodes {
            let slot = &mut self.slots[node.index as usize];
            slot.segment = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(node.index);
        }
        self.len -= nodes.len();
        nodes.len()
    }
}

impl Index<SegmentId> for TrajectoryTree {
    type Output = TrajectorySegment;

    fn index(&self, id: SegmentId) -> &TrajectorySegment {
        match self.get(id) {
            Some(segment) => segment,
            None => panic!("stale segment id {}", id),
        }
    }
}

impl IndexMut<SegmentId> for TrajectoryTree {
    fn index_mut(&mut self, id: SegmentId) -> &mut TrajectorySegment {
        match self.get_mut(id) {
            Some(segment) => segment,
            None => panic!("stale segment id {}", id),
        }
    }
}
