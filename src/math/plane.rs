//! Plane implementation.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// An infinite plane defined by a normal and constant.
/// The plane equation is: normal · point + constant = 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Normal vector of the plane (should be normalized).
    pub normal: Vec3,
    /// Signed distance term of the plane equation.
    pub constant: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self::new(Vec3::X, 0.0)
    }
}

impl Plane {
    /// Create a new plane.
    #[inline]
    pub const fn new(normal: Vec3, constant: f32) -> Self {
        Self { normal, constant }
    }

    /// Create from the (a, b, c, d) coefficients of `ax + by + cz + d = 0`.
    #[inline]
    pub fn from_coefficients(v: Vec4) -> Self {
        Self {
            normal: v.truncate(),
            constant: v.w,
        }
    }

    /// Create a plane from a normal and a point on the plane.
    #[inline]
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        let n = normal.normalize();
        Self {
            normal: n,
            constant: -point.dot(n),
        }
    }

    /// Return a copy whose normal has unit length.
    pub fn normalized(&self) -> Self {
        let inv_len = self.normal.length().recip();
        Self {
            normal: self.normal * inv_len,
            constant: self.constant * inv_len,
        }
    }

    /// Signed distance from a point to the plane.
    /// Positive = point is on the normal side.
    #[inline]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_point() {
        let plane = Plane::new(Vec3::Y, 0.0);
        assert!((plane.distance_to_point(Vec3::new(0.0, 5.0, 0.0)) - 5.0).abs() < 1e-6);
        assert!((plane.distance_to_point(Vec3::new(0.0, -3.0, 0.0)) + 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalized_keeps_distances_proportional() {
        let plane = Plane::from_coefficients(Vec4::new(0.0, 2.0, 0.0, -4.0)).normalized();
        assert!((plane.normal.length() - 1.0).abs() < 1e-6);
        assert!(plane.distance_to_point(Vec3::new(0.0, 2.0, 0.0)).abs() < 1e-6);
    }
}
