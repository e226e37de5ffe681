//! Camera helper for visualizing a camera frustum.

use bytemuck::{Pod, Zeroable};

use crate::camera::Camera;
use crate::math::{Mat4, Vec3};

/// Vertex of a helper line list.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct HelperVertex {
    /// Position in the camera's local space.
    pub position: [f32; 3],
    /// RGBA color.
    pub color: [f32; 4],
}

impl HelperVertex {
    fn new(position: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }

    /// Get the vertex buffer layout for this vertex type.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];
}

const FRUSTUM_COLOR: [f32; 4] = [1.0, 0.67, 0.0, 1.0];
const CONE_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Wireframe of a camera frustum, drawn as a line list in the camera's
/// local space. Attach it as a child of the camera node.
#[derive(Debug, Clone, Default)]
pub struct CameraHelper {
    vertices: Vec<HelperVertex>,
}

impl CameraHelper {
    /// Create a helper outlining `camera`.
    pub fn new(camera: &Camera) -> Self {
        let mut helper = Self::default();
        helper.update(camera);
        helper
    }

    /// Rebuild the lines from the camera's current projection.
    pub fn update(&mut self, camera: &Camera) {
        self.update_from_projection_inverse(camera.projection_matrix_inverse());
    }

    /// Rebuild the lines from an inverse projection matrix.
    pub fn update_from_projection_inverse(&mut self, inverse: &Mat4) {
        let corner = |x: f32, y: f32, z: f32| inverse.project_point3(Vec3::new(x, y, z));

        let near = [
            corner(-1.0, -1.0, -1.0),
            corner(1.0, -1.0, -1.0),
            corner(1.0, 1.0, -1.0),
            corner(-1.0, 1.0, -1.0),
        ];
        let far = [
            corner(-1.0, -1.0, 1.0),
            corner(1.0, -1.0, 1.0),
            corner(1.0, 1.0, 1.0),
            corner(-1.0, 1.0, 1.0),
        ];

        self.vertices.clear();
        for i in 0..4 {
            let j = (i + 1) % 4;
            self.line(near[i], near[j], FRUSTUM_COLOR);
            self.line(far[i], far[j], FRUSTUM_COLOR);
            self.line(near[i], far[i], FRUSTUM_COLOR);
            self.line(Vec3::ZERO, far[i], CONE_COLOR);
        }
    }

    fn line(&mut self, a: Vec3, b: Vec3, color: [f32; 4]) {
        self.vertices.push(HelperVertex::new(a, color));
        self.vertices.push(HelperVertex::new(b, color));
    }

    /// Line list vertices.
    #[inline]
    pub fn vertices(&self) -> &[HelperVertex] {
        &self.vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ortho_box_outline() {
        let camera = Camera::orthographic(-2.0, 2.0, 1.0, -1.0, 1.0, 10.0);
        let helper = CameraHelper::new(&camera);
        assert_eq!(helper.vertices().len(), 32);

        let xs: Vec<f32> = helper
            .vertices()
            .iter()
            .filter(|v| v.color == FRUSTUM_COLOR)
            .map(|v| v.position[0])
            .collect();
        let max_x = xs.iter().cloned().fold(f32::MIN, f32::max);
        assert!((max_x - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_update_follows_projection() {
        let mut camera = Camera::orthographic(-1.0, 1.0, 1.0, -1.0, 1.0, 10.0);
        let mut helper = CameraHelper::new(&camera);
        camera.set_ortho_bounds(-5.0, 5.0, 5.0, -5.0);
        camera.update_projection_matrix();
        helper.update(&camera);

        let max_y = helper
            .vertices()
            .iter()
            .map(|v| v.position[1])
            .fold(f32::MIN, f32::max);
        assert!((max_y - 5.0).abs() < 1e-4);
    }
}
