//! Per-light shadow settings and resources.

use crate::math::{Mat4, Vec2};
use crate::scene::NodeId;
use crate::texture::RenderTarget;

/// Shadow camera settings plus the resources the shadow pass allocates for a light.
///
/// `map`, `matrix` and `camera` start empty and are created on the first
/// shadow pass that sees this light; after that they are reused every frame.
#[derive(Debug)]
pub struct LightShadow {
    /// Shadow camera near plane.
    pub camera_near: f32,
    /// Shadow camera far plane.
    pub camera_far: f32,
    /// Vertical field of view in degrees (spot lights).
    pub camera_fov: f32,
    /// Orthographic box left (directional lights).
    pub camera_left: f32,
    /// Orthographic box right.
    pub camera_right: f32,
    /// Orthographic box top.
    pub camera_top: f32,
    /// Orthographic box bottom.
    pub camera_bottom: f32,
    /// Show a frustum helper for the shadow camera.
    pub camera_visible: bool,
    /// Depth bias applied when sampling.
    pub bias: f32,
    /// How dark shadowed areas become, 0..1.
    pub darkness: f32,
    /// Shadow map width in texels.
    pub map_width: u32,
    /// Shadow map height in texels.
    pub map_height: u32,

    /// Depth-encoded shadow map.
    pub map: Option<RenderTarget>,
    /// Size of `map` at creation time.
    pub map_size: Option<Vec2>,
    /// World to shadow-map texture space.
    pub matrix: Option<Mat4>,
    /// Shadow camera node.
    pub camera: Option<NodeId>,
    /// Debug helper node, child of the shadow camera.
    pub camera_helper: Option<NodeId>,
}

impl Default for LightShadow {
    fn default() -> Self {
        Self {
            camera_near: 50.0,
            camera_far: 5000.0,
            camera_fov: 50.0,
            camera_left: -500.0,
            camera_right: 500.0,
            camera_top: 500.0,
            camera_bottom: -500.0,
            camera_visible: false,
            bias: 0.0,
            darkness: 0.5,
            map_width: 512,
            map_height: 512,
            map: None,
            map_size: None,
            matrix: None,
            camera: None,
            camera_helper: None,
        }
    }
}

impl LightShadow {
    /// Builder: set the shadow map resolution.
    pub fn with_map_size(mut self, width: u32, height: u32) -> Self {
        self.map_width = width;
        self.map_height = height;
        self
    }

    /// Builder: set the orthographic box.
    pub fn with_camera_box(mut self, left: f32, right: f32, top: f32, bottom: f32) -> Self {
        self.camera_left = left;
        self.camera_right = right;
        self.camera_top = top;
        self.camera_bottom = bottom;
        self
    }

    /// Builder: set the near/far planes.
    pub fn with_camera_range(mut self, near: f32, far: f32) -> Self {
        self.camera_near = near;
        self.camera_far = far;
        self
    }

    /// Whether the shadow pass has provisioned this light yet.
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.map.is_some() && self.camera.is_some()
    }

    /// Aspect ratio of the shadow map.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.map_width as f32 / self.map_height as f32
    }
}
