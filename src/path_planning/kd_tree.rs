//! Incremental 3-D kd-tree for nearest neighbour search
//!
//! Items are addressed by insertion order. A full `build` produces a balanced
//! tree by median splits on the widest axis; `insert` descends the existing
//! tree and attaches a new leaf without rebalancing.

use nalgebra::Vector3;

#[derive(Debug, Clone, Copy)]
struct KdNode {
    item: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Debug, Default)]
pub struct KdTree {
    points: Vec<Vector3<f64>>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

impl KdTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the content with `points`, item `i` being `points[i]`
    pub fn build(&mut self, points: Vec<Vector3<f64>>) {
        self.points = points;
        self.nodes.clear();
        self.nodes.reserve(self.points.len());
        let mut items: Vec<usize> = (0..self.points.len()).collect();
        self.root = build_recursive(&self.points, &mut items, &mut self.nodes);
    }

    /// Add a point and return its item index
    pub fn insert(&mut self, point: Vector3<f64>) -> usize {
        let item = self.points.len();
        self.points.push(point);
        let node_index = self.nodes.len();

        let mut current = match self.root {
            Some(root) => root,
            None => {
                self.nodes.push(KdNode { item, axis: 0, left: None, right: None });
                self.root = Some(node_index);
                return item;
            }
        };
        loop {
            let node = self.nodes[current];
            let go_left = point[node.axis] < self.points[node.item][node.axis];
            let next = if go_left { node.left } else { node.right };
            match next {
                Some(child) => current = child,
                None => {
                    self.nodes.push(KdNode {
                        item,
                        axis: (node.axis + 1) % 3,
                        left: None,
                        right: None,
                    });
                    if go_left {
                        self.nodes[current].left = Some(node_index);
                    } else {
                        self.nodes[current].right = Some(node_index);
                    }
                    return item;
                }
            }
        }
    }

    /// Item closest to `query` with its squared distance
    pub fn nearest(&self, query: &Vector3<f64>) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        // (node, lower bound of the squared distance to anything below it)
        let mut stack = vec![(self.root?, 0.0)];

        while let Some((node_index, bound)) = stack.pop() {
            if best.map_or(false, |(_, d)| bound >= d) {
                continue;
            }
            let node = self.nodes[node_index];
            let point = &self.points[node.item];
            let dist_sq = (point - query).norm_squared();
            if best.map_or(true, |(_, d)| dist_sq < d) {
                best = Some((node.item, dist_sq));
            }

            let diff = query[node.axis] - point[node.axis];
            let (near, far) = if diff < 0.0 {
                (node.left, node.right)
            } else {
                (node.right, node.left)
            };
            if let Some(far) = far {
                stack.push((far, bound.max(diff * diff)));
            }
            if let Some(near) = near {
                stack.push((near, bound));
            }
        }
        best
    }

    pub fn point(&self, item: usize) -> Option<&Vector3<f64>> {
        self.points.get(item)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.nodes.clear();
        self.root = None;
    }
}

fn build_recursive(points: &[Vector3<f64>], items: &mut [usize], nodes: &mut Vec<KdNode>) -> Option<usize> {
    if items.is_empty() {
        return None;
    }

    let mut min = Vector3::repeat(f64::INFINITY);
    let mut max = Vector3::repeat(f64::NEG_INFINITY);
    for &item in items.iter() {
        min = min.inf(&points[item]);
        max = max.sup(&points[item]);
    }
    let axis = (max - min).imax();

    let mid = items.len() / 2;
    items.select_nth_unstable_by(mid, |&a, &b| points[a][axis].total_cmp(&points[b][axis]));

    let node_index = nodes.len();
    nodes.push(KdNode {
        item: items[mid],
        axis,
        left: None,
        right: None,
    });
    let (lower, upper) = items.split_at_mut(mid);
    let left = build_recursive(points, lower, nodes);
    let right = build_recursive(points, &mut upper[1..], nodes);
    nodes[node_index].left = left;
    nodes[node_index].right = right;
    Some(node_index)
}
