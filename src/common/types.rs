//! Common types used throughout exploration_planner

use std::f64::consts::PI;

use nalgebra::{UnitQuaternion, Vector3};

use crate::common::error::{PlannerError, PlannerResult};

/// Wrap an angle to [-pi, pi)
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    // rem_euclid may round up to exactly 2*pi for tiny negative inputs
    if wrapped >= PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}

/// A single timed pose of a trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    /// Position in the world frame [m]
    pub position: Vector3<f64>,
    /// Heading about the world z axis [rad]
    pub yaw: f64,
    /// Time since the start of the owning segment [ns]
    pub time_from_start_ns: i64,
}

impl TrajectoryPoint {
    pub fn new(position: Vector3<f64>, yaw: f64, time_from_start_ns: i64) -> Self {
        Self {
            position,
            yaw,
            time_from_start_ns,
        }
    }

    /// Pose at `position` with zero heading and zero time
    pub fn at(position: Vector3<f64>) -> Self {
        Self::new(position, 0.0, 0)
    }

    pub fn orientation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(0.0, 0.0, self.yaw)
    }

    pub fn time_from_start(&self) -> f64 {
        self.time_from_start_ns as f64 * 1.0e-9
    }
}

/// Axis-aligned box bounding the sampled region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingVolume {
    min: Vector3<f64>,
    max: Vector3<f64>,
}

impl BoundingVolume {
    /// Create a box, requiring finite corners with `min <= max` on every axis
    /// and a finite diagonal.
    pub fn new(min: Vector3<f64>, max: Vector3<f64>) -> PlannerResult<Self> {
        for axis in 0..3 {
            if !min[axis].is_finite() || !max[axis].is_finite() {
                return Err(PlannerError::InvalidParameter(format!(
                    "bounding volume axis {} is not finite",
                    axis
                )));
            }
            if min[axis] > max[axis] {
                return Err(PlannerError::InvalidParameter(format!(
                    "bounding volume axis {}: min {} > max {}",
                    axis, min[axis], max[axis]
                )));
            }
        }
        let bounds = Self { min, max };
        if !bounds.diagonal().is_finite() {
            return Err(PlannerError::InvalidParameter(
                "bounding volume diagonal overflows".to_string(),
            ));
        }
        Ok(bounds)
    }

    /// Create from `[x_min, x_max, y_min, y_max, z_min, z_max]`
    pub fn from_array(bounds: [f64; 6]) -> PlannerResult<Self> {
        Self::new(
            Vector3::new(bounds[0], bounds[2], bounds[4]),
            Vector3::new(bounds[1], bounds[3], bounds[5]),
        )
    }

    pub fn min(&self) -> &Vector3<f64> {
        &self.min
    }

    pub fn max(&self) -> &Vector3<f64> {
        &self.max
    }

    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Length of the box diagonal
    pub fn diagonal(&self) -> f64 {
        self.extent().norm()
    }

    pub fn center(&self) -> Vector3<f64> {
        (self.min + self.max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wrap_angle() {
        assert_relative_eq!(wrap_angle(0.5), 0.5);
        assert_relative_eq!(wrap_angle(1.5 * PI), -0.5 * PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(PI), -PI);
        for i in 0..100 {
            let a = wrap_angle(i as f64 * 0.37 - 20.0);
            assert!(a >= -PI && a < PI);
        }
    }

    #[test]
    fn test_orientation_from_yaw() {
        let point = TrajectoryPoint::new(Vector3::zeros(), 0.7, 0);
        let (_, _, yaw) = point.orientation().euler_angles();
        assert_relative_eq!(yaw, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_bounding_volume_contains() {
        let bounds = BoundingVolume::from_array([0.0, 10.0, -5.0, 5.0, 0.0, 2.0]).unwrap();
        assert!(bounds.contains(&Vector3::new(0.0, -5.0, 2.0)));
        assert!(bounds.contains(&Vector3::new(5.0, 0.0, 1.0)));
        assert!(!bounds.contains(&Vector3::new(10.1, 0.0, 1.0)));
        assert!(!bounds.contains(&Vector3::new(5.0, 0.0, -0.1)));
        assert_relative_eq!(bounds.diagonal(), (100.0f64 + 100.0 + 4.0).sqrt());
    }

    #[test]
    fn test_bounding_volume_rejects_inverted_axis() {
        let result = BoundingVolume::new(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 1.0));
        assert!(matches!(result, Err(PlannerError::InvalidParameter(_))));
    }

    #[test]
    fn test_bounding_volume_rejects_overflowing_diagonal() {
        let result = BoundingVolume::from_array([-1.0e308, 1.0e308, 0.0, 1.0, 0.0, 1.0]);
        assert!(matches!(result, Err(PlannerError::InvalidParameter(_))));
        let result = BoundingVolume::from_array([0.0, f64::INFINITY, 0.0, 1.0, 0.0, 1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bounding_volume_accessors() {
        let bounds = BoundingVolume::from_array([-1.0, 2.0, -3.0, 4.0, 0.5, 1.5]).unwrap();
        assert_eq!(*bounds.min(), Vector3::new(-1.0, -3.0, 0.5));
        assert_eq!(*bounds.max(), Vector3::new(2.0, 4.0, 1.5));
        assert_relative_eq!(bounds.center(), Vector3::new(0.5, 0.5, 1.0));
    }
}
