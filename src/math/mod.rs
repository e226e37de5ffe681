//! # Math Module
//!
//! Geometric primitives used by the scene graph and the shadow passes.
//!
//! Vectors, matrices and quaternions come straight from `glam`; this module
//! adds the Three.js-flavoured pieces glam does not have (planes, bounding
//! spheres, view frusta, RGB colors) plus a few matrix helpers.

mod color;
mod frustum;
mod plane;
mod sphere;

pub use color::Color;
pub use frustum::Frustum;
pub use plane::Plane;
pub use sphere::Sphere;

pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

/// Common math constants and utilities.
pub mod consts {
    /// Degrees to radians conversion factor.
    pub const DEG2RAD: f32 = std::f32::consts::PI / 180.0;
    /// Radians to degrees conversion factor.
    pub const RAD2DEG: f32 = 180.0 / std::f32::consts::PI;
    /// Small epsilon for floating point comparisons.
    pub const EPSILON: f32 = 1e-6;
}

/// Matrix mapping clip space `[-1, 1]` onto texture space `[0, 1]` on all three axes.
///
/// Pre-multiplied onto a light's view-projection to build its shadow matrix.
pub const SHADOW_BIAS_MATRIX: Mat4 = Mat4::from_cols_array(&[
    0.5, 0.0, 0.0, 0.0,
    0.0, 0.5, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.5, 0.5, 0.5, 1.0,
]);

/// Rotation that orients an object at `eye` towards `target`.
///
/// Cameras (and anything that looks down its local -Z) pass `negative_z = true`;
/// other objects point their local +Z at the target.
pub fn look_rotation(eye: Vec3, target: Vec3, up: Vec3, negative_z: bool) -> Quat {
    let mut z = if negative_z { eye - target } else { target - eye };
    if z.length_squared() == 0.0 {
        z.z = 1.0;
    }
    let z = z.normalize();

    let mut x = up.cross(z);
    if x.length_squared() == 0.0 {
        // up and forward are parallel, nudge forward off-axis
        let nudged = (z + Vec3::new(1e-4, 0.0, 0.0)).normalize();
        x = up.cross(nudged);
    }
    let x = x.normalize();
    let y = z.cross(x);

    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

/// Largest scale factor along any of the matrix's basis axes.
#[inline]
pub fn max_scale_on_axis(m: &Mat4) -> f32 {
    let sx = m.x_axis.truncate().length_squared();
    let sy = m.y_axis.truncate().length_squared();
    let sz = m.z_axis.truncate().length_squared();
    sx.max(sy).max(sz).sqrt()
}

/// Flatten a matrix into the column-major array layout GPU uniforms expect.
#[inline]
pub fn flatten(m: &Mat4, out: &mut [f32; 16]) {
    *out = m.to_cols_array();
}

/// Check whether a value is a power of two.
#[inline]
pub fn is_power_of_two(value: u32) -> bool {
    value != 0 && value & (value - 1) == 0
}
