//! Virtual light standing in for one cascade of a directional light.

use crate::math::Vec3;
use crate::scene::NodeId;

/// Unit-square XY of the four corners on each cascade plane.
const CORNER_XY: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)];

/// Virtual light payload.
#[derive(Debug, Clone, Default)]
pub struct VirtualLight {
    /// Slice corners in the viewing camera's clip space: 0..4 near, 4..8 far.
    pub points_frustum: [Vec3; 8],
    /// `points_frustum` unprojected to world space by the last fit.
    pub points_world: [Vec3; 8],
    /// Camera this cascade was created for; fitting only runs when rendering through it.
    pub original_camera: Option<NodeId>,
}

impl VirtualLight {
    /// Create a virtual light spanning clip depths `near_z..far_z`.
    pub fn new(near_z: f32, far_z: f32) -> Self {
        let mut light = Self::default();
        for (i, (x, y)) in CORNER_XY.iter().enumerate() {
            light.points_frustum[i] = Vec3::new(*x, *y, near_z);
            light.points_frustum[i + 4] = Vec3::new(*x, *y, far_z);
        }
        light
    }

    /// Move the slice to new clip depths. XY of the corners never change.
    pub fn set_depth_range(&mut self, near_z: f32, far_z: f32) {
        for point in &mut self.points_frustum[..4] {
            point.z = near_z;
        }
        for point in &mut self.points_frustum[4..] {
            point.z = far_z;
        }
    }
}
