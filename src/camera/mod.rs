//! Cameras module.
//!
//! A camera is a scene node payload: the node supplies the world matrix, the
//! [`Camera`] keeps the projection and the cached inverse world matrix.

mod projection;

pub use projection::Projection;

use crate::core::Id;
use crate::math::{flatten, Mat4, Vec3};

/// A projection camera.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Unique ID.
    id: Id,
    /// Projection parameters.
    pub projection: Projection,
    /// Projection matrix built from `projection`.
    projection_matrix: Mat4,
    /// Inverse of `projection_matrix`.
    projection_matrix_inverse: Mat4,
    /// Inverse of the owning node's world matrix (the view matrix).
    matrix_world_inverse: Mat4,
    /// Column-major copy of the view matrix for uniform upload.
    view_matrix_array: [f32; 16],
    /// Column-major copy of the projection matrix for uniform upload.
    projection_matrix_array: [f32; 16],
}

impl Camera {
    /// Create a camera from projection parameters.
    pub fn new(projection: Projection) -> Self {
        let mut camera = Self {
            id: Id::new(),
            projection,
            projection_matrix: Mat4::IDENTITY,
            projection_matrix_inverse: Mat4::IDENTITY,
            matrix_world_inverse: Mat4::IDENTITY,
            view_matrix_array: [0.0; 16],
            projection_matrix_array: [0.0; 16],
        };
        camera.update_projection_matrix();
        camera
    }

    /// Create a perspective camera. `fov` is the vertical field of view in degrees.
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Perspective {
            fov,
            aspect,
            near,
            far,
        })
    }

    /// Create an orthographic camera.
    pub fn orthographic(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Orthographic {
            left,
            right,
            top,
            bottom,
            near,
            far,
        })
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Whether this is a perspective camera.
    #[inline]
    pub fn is_perspective(&self) -> bool {
        matches!(self.projection, Projection::Perspective { .. })
    }

    /// Near clipping distance.
    #[inline]
    pub fn near(&self) -> f32 {
        self.projection.near()
    }

    /// Far clipping distance.
    #[inline]
    pub fn far(&self) -> f32 {
        self.projection.far()
    }

    /// Rebuild the projection matrix and its inverse from `projection`.
    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = self.projection.matrix();
        self.projection_matrix_inverse = self.projection_matrix.inverse();
    }

    /// Set the box of an orthographic camera. No-op for perspective cameras.
    /// Call [`Self::update_projection_matrix`] afterwards.
    pub fn set_ortho_bounds(&mut self, left: f32, right: f32, top: f32, bottom: f32) {
        if let Projection::Orthographic {
            left: l,
            right: r,
            top: t,
            bottom: b,
            ..
        } = &mut self.projection
        {
            *l = left;
            *r = right;
            *t = top;
            *b = bottom;
        }
    }

    /// Get the projection matrix.
    #[inline]
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Get the inverse projection matrix.
    #[inline]
    pub fn projection_matrix_inverse(&self) -> &Mat4 {
        &self.projection_matrix_inverse
    }

    /// Get the view matrix.
    #[inline]
    pub fn matrix_world_inverse(&self) -> &Mat4 {
        &self.matrix_world_inverse
    }

    pub(crate) fn set_matrix_world_inverse(&mut self, inverse: Mat4) {
        self.matrix_world_inverse = inverse;
    }

    /// Projection times view.
    #[inline]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.matrix_world_inverse
    }

    /// Map a point from normalized device coordinates back to world space,
    /// given the camera node's world matrix.
    pub fn unproject(&self, point: Vec3, matrix_world: &Mat4) -> Vec3 {
        (*matrix_world * self.projection_matrix_inverse).project_point3(point)
    }

    /// Refresh the flat view and projection arrays.
    pub fn flatten_matrices(&mut self) {
        flatten(&self.matrix_world_inverse, &mut self.view_matrix_array);
        flatten(&self.projection_matrix, &mut self.projection_matrix_array);
    }

    /// Flat view matrix.
    #[inline]
    pub fn view_matrix_array(&self) -> &[f32; 16] {
        &self.view_matrix_array
    }

    /// Flat projection matrix.
    #[inline]
    pub fn projection_matrix_array(&self) -> &[f32; 16] {
        &self.projection_matrix_array
    }
}
