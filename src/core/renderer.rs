//! Renderer contract consumed by render plugins.

use super::{GraphicsContext, RenderResult};
use crate::geometry::GeometryBuffer;
use crate::material::Material;
use crate::math::Color;
use crate::scene::{NodeId, Scene};
use crate::texture::RenderTargetTexture;

/// Render statistics for the current frame.
#[derive(Debug, Clone, Default)]
pub struct RenderInfo {
    /// Number of draw calls.
    pub draw_calls: u32,
    /// Number of render target switches.
    pub target_switches: u32,
    /// Frame number.
    pub frame: u64,
}

impl RenderInfo {
    /// Reset the per-frame statistics.
    pub fn reset(&mut self) {
        self.draw_calls = 0;
        self.target_switches = 0;
    }
}

/// What a render plugin needs from the renderer that owns it.
///
/// Draw calls receive the scene plus node ids rather than object references so
/// a backend can read whatever per-object state it needs (world matrix,
/// cached model-view matrix, skeleton, morph influences).
pub trait Renderer {
    /// Low-level state access.
    fn gl(&mut self) -> &mut dyn GraphicsContext;

    /// Toggle depth testing.
    fn set_depth_test(&mut self, enabled: bool);

    /// Bind an off-screen target, allocating its GPU objects on first use.
    /// `None` binds the default framebuffer.
    fn set_render_target(&mut self, target: Option<&mut dyn RenderTargetTexture>)
        -> RenderResult<()>;

    /// Clear the bound target with the current clear color and depth.
    fn clear(&mut self);

    /// Draw a single combined geometry buffer.
    fn render_buffer_direct(
        &mut self,
        scene: &Scene,
        camera: NodeId,
        material: &Material,
        buffer: &GeometryBuffer,
        object: NodeId,
    ) -> RenderResult<()>;

    /// Draw one group of a grouped geometry buffer.
    fn render_buffer(
        &mut self,
        scene: &Scene,
        camera: NodeId,
        material: &Material,
        buffer: &GeometryBuffer,
        object: NodeId,
    ) -> RenderResult<()>;

    /// Clear color configured by the owner of the renderer.
    fn clear_color(&self) -> Color;

    /// Clear alpha configured by the owner of the renderer.
    fn clear_alpha(&self) -> f32;

    /// Whether the renderer refreshes scene matrices itself every frame.
    fn is_auto_update_scene(&self) -> bool {
        true
    }
}
