// Voxel occupancy map
//
// Minimal environment model answering traversability queries: a point is
// traversable when it lies inside the map bounds and its voxel is free.

use std::collections::HashSet;

use itertools::iproduct;
use nalgebra::Vector3;

use crate::common::{BoundingVolume, PlannerError, PlannerResult, TraversabilityOracle};

type VoxelIndex = (i64, i64, i64);

/// Sparse set of occupied voxels inside a bounding box
#[derive(Debug, Clone)]
pub struct VoxelMap {
    resolution: f64,
    bounds: BoundingVolume,
    occupied: HashSet<VoxelIndex>,
}

impl VoxelMap {
    pub fn new(bounds: BoundingVolume, resolution: f64) -> PlannerResult<Self> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "voxel resolution must be positive, got {}",
                resolution
            )));
        }
        Ok(Self {
            resolution,
            bounds,
            occupied: HashSet::new(),
        })
    }

    pub fn bounds(&self) -> &BoundingVolume {
        &self.bounds
    }

    pub fn voxel_index(&self, point: &Vector3<f64>) -> VoxelIndex {
        let scaled = point / self.resolution;
        (
            scaled.x.floor() as i64,
            scaled.y.floor() as i64,
            scaled.z.floor() as i64,
        )
    }

    pub fn voxel_center(&self, index: VoxelIndex) -> Vector3<f64> {
        Vector3::new(index.0 as f64 + 0.5, index.1 as f64 + 0.5, index.2 as f64 + 0.5) * self.resolution
    }

    pub fn set_occupied(&mut self, point: &Vector3<f64>) {
        let index = self.voxel_index(point);
        self.occupied.insert(index);
    }

    /// Occupy every voxel touching the box `[min, max]`
    pub fn add_box(&mut self, min: &Vector3<f64>, max: &Vector3<f64>) {
        let lo = self.voxel_index(min);
        let hi = self.voxel_index(max);
        for (ix, iy, iz) in iproduct!(lo.0..=hi.0, lo.1..=hi.1, lo.2..=hi.2) {
            self.occupied.insert((ix, iy, iz));
        }
    }

    pub fn is_occupied(&self, point: &Vector3<f64>) -> bool {
        self.occupied.contains(&self.voxel_index(point))
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    pub fn occupied_centers(&self) -> Vec<Vector3<f64>> {
        self.occupied.iter().map(|&index| self.voxel_center(index)).collect()
    }
}

impl TraversabilityOracle for VoxelMap {
    fn is_traversable(&self, point: &Vector3<f64>) -> bool {
        self.bounds.contains(point) && !self.is_occupied(point)
    }

    fn resolution(&self) -> f64 {
        self.resolution
    }
}
