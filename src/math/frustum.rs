//! View frustum implementation for culling.

use super::{Plane, Sphere};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// A view frustum defined by 6 planes, normals pointing inwards.
/// Used for frustum culling.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frustum {
    /// The six planes of the frustum.
    /// Order: left, right, bottom, top, near, far
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a new frustum from 6 planes.
    #[inline]
    pub const fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Create a frustum from a projection-view matrix (OpenGL clip convention).
    pub fn from_matrix(m: &Mat4) -> Self {
        let r0 = m.row(0);
        let r1 = m.row(1);
        let r2 = m.row(2);
        let r3 = m.row(3);

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0).normalized(),
                Plane::from_coefficients(r3 - r0).normalized(),
                Plane::from_coefficients(r3 + r1).normalized(),
                Plane::from_coefficients(r3 - r1).normalized(),
                Plane::from_coefficients(r3 + r2).normalized(),
                Plane::from_coefficients(r3 - r2).normalized(),
            ],
        }
    }

    /// Set the frustum from a projection-view matrix.
    pub fn set_from_matrix(&mut self, m: &Mat4) -> &mut Self {
        *self = Self::from_matrix(m);
        self
    }

    /// Check if a point is inside the frustum.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Check if a sphere intersects the frustum.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(sphere.center) >= -sphere.radius)
    }

    /// Get the near plane.
    #[inline]
    pub fn near(&self) -> &Plane {
        &self.planes[4]
    }

    /// Get the far plane.
    #[inline]
    pub fn far(&self) -> &Plane {
        &self.planes[5]
    }
}
