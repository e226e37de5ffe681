//! Bounding sphere implementation.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// A bounding sphere defined by center and radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Center of the sphere.
    pub center: Vec3,
    /// Radius of the sphere.
    pub radius: f32,
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0)
    }
}

impl Sphere {
    /// Create a new sphere.
    #[inline]
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Create a sphere that bounds an array of points.
    ///
    /// The center is the midpoint of the points' bounding box.
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };

        let (min, max) = points
            .iter()
            .skip(1)
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        let center = (min + max) * 0.5;

        let max_dist_sq = points
            .iter()
            .map(|p| center.distance_squared(*p))
            .fold(0.0_f32, f32::max);

        Self {
            center,
            radius: max_dist_sq.sqrt(),
        }
    }

    /// Check if a point is inside the sphere.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    /// Transform the sphere by a matrix; the radius grows with the largest axis scale.
    pub fn apply_matrix4(&self, m: &Mat4) -> Self {
        Self {
            center: m.transform_point3(self.center),
            radius: self.radius * super::max_scale_on_axis(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let s = Sphere::from_points(&[Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)]);
        assert!(s.center.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!((s.radius - 1.0).abs() < 1e-6);
        assert!(s.contains_point(Vec3::new(0.5, 0.0, 0.0)));
    }

    #[test]
    fn test_apply_matrix4() {
        let s = Sphere::new(Vec3::ZERO, 1.0);
        let m = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            glam::Quat::IDENTITY,
            Vec3::new(0.0, 3.0, 0.0),
        );
        let t = s.apply_matrix4(&m);
        assert!(t.center.abs_diff_eq(Vec3::new(0.0, 3.0, 0.0), 1e-6));
        assert!((t.radius - 2.0).abs() < 1e-6);
    }
}
