//! Transform component for scene objects.

use crate::math::{look_rotation, Mat4, Quat, Vec3};

/// Local position, rotation and scale of a scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Local position.
    pub position: Vec3,
    /// Local rotation.
    pub quaternion: Quat,
    /// Local scale.
    pub scale: Vec3,
    /// Up direction used by look-at.
    pub up: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Create a new identity transform.
    pub const fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            quaternion: Quat::IDENTITY,
            scale: Vec3::ONE,
            up: Vec3::Y,
        }
    }

    /// Create a transform from position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Set position.
    #[inline]
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
    }

    /// Rotate so the node faces `target` from its local position.
    ///
    /// With `negative_z` the local -Z axis is aimed (cameras); otherwise +Z.
    pub fn look_at(&mut self, target: Vec3, negative_z: bool) {
        self.quaternion = look_rotation(self.position, target, self.up, negative_z);
    }

    /// Compose the local transformation matrix.
    #[inline]
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quaternion, self.position)
    }
}
