//! Recording doubles for the renderer contracts.

use slotmap::SlotMap;

use super::{
    Capability, CullFaceMode, FramebufferHandle, FrontFaceDirection, GraphicsContext, Id,
    RasterState, RenderResult, RenderbufferHandle, Renderer, TextureHandle,
};
use crate::geometry::GeometryBuffer;
use crate::material::Material;
use crate::math::Color;
use crate::scene::{NodeId, Scene};
use crate::texture::{RenderTargetTexture, TextureDescriptor};

/// Graphics context that tracks live objects and raster state.
#[derive(Default)]
pub(crate) struct RecordingGraphics {
    pub state: RasterState,
    pub textures: SlotMap<TextureHandle, TextureDescriptor>,
    pub framebuffers: SlotMap<FramebufferHandle, (TextureHandle, u32)>,
    pub renderbuffers: SlotMap<RenderbufferHandle, (u32, u32)>,
    pub mipmaps_generated: usize,
}

impl GraphicsContext for RecordingGraphics {
    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.state.clear_color = [r, g, b, a];
    }

    fn enable(&mut self, cap: Capability) {
        self.state.set_capability(cap, true);
    }

    fn disable(&mut self, cap: Capability) {
        self.state.set_capability(cap, false);
    }

    fn front_face(&mut self, direction: FrontFaceDirection) {
        self.state.front_face = direction;
    }

    fn cull_face(&mut self, mode: CullFaceMode) {
        self.state.cull_face_mode = mode;
    }

    fn raster_state(&self) -> RasterState {
        self.state
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> RenderResult<TextureHandle> {
        Ok(self.textures.insert(*desc))
    }

    fn create_renderbuffer(
        &mut self,
        width: u32,
        height: u32,
        _stencil: bool,
    ) -> RenderResult<RenderbufferHandle> {
        Ok(self.renderbuffers.insert((width, height)))
    }

    fn create_framebuffer(
        &mut self,
        color: TextureHandle,
        layer: u32,
        _depth: Option<RenderbufferHandle>,
    ) -> RenderResult<FramebufferHandle> {
        Ok(self.framebuffers.insert((color, layer)))
    }

    fn generate_mipmap(&mut self, _texture: TextureHandle) -> RenderResult<()> {
        self.mipmaps_generated += 1;
        Ok(())
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(texture);
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.framebuffers.remove(framebuffer);
    }

    fn delete_renderbuffer(&mut self, renderbuffer: RenderbufferHandle) {
        self.renderbuffers.remove(renderbuffer);
    }
}

/// Which renderer entry point a draw went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DrawEntry {
    Direct,
    Grouped,
}

/// One recorded draw.
#[derive(Debug, Clone)]
pub(crate) struct DrawCall {
    pub entry: DrawEntry,
    pub camera: NodeId,
    pub object: NodeId,
    pub material: Id,
    pub material_name: String,
    pub target: Option<Id>,
}

/// Renderer that records what a plugin asked of it.
pub(crate) struct RecordingRenderer {
    pub gl: RecordingGraphics,
    pub clear_color: Color,
    pub clear_alpha: f32,
    pub auto_update_scene: bool,
    pub depth_test: bool,
    pub bound_target: Option<Id>,
    pub target_binds: Vec<Option<Id>>,
    pub clears: usize,
    pub draws: Vec<DrawCall>,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self {
            gl: RecordingGraphics::default(),
            clear_color: Color::new(0.2, 0.3, 0.4),
            clear_alpha: 0.5,
            auto_update_scene: true,
            depth_test: false,
            bound_target: None,
            target_binds: Vec::new(),
            clears: 0,
            draws: Vec::new(),
        }
    }
}

impl RecordingRenderer {
    fn record(&mut self, entry: DrawEntry, camera: NodeId, material: &Material, object: NodeId) {
        self.draws.push(DrawCall {
            entry,
            camera,
            object,
            material: material.id(),
            material_name: material.name.clone(),
            target: self.bound_target,
        });
    }
}

impl Renderer for RecordingRenderer {
    fn gl(&mut self) -> &mut dyn GraphicsContext {
        &mut self.gl
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
        self.gl.state.depth_test = enabled;
    }

    fn set_render_target(
        &mut self,
        target: Option<&mut dyn RenderTargetTexture>,
    ) -> RenderResult<()> {
        let id = match target {
            Some(target) => {
                target.allocate(&mut self.gl)?;
                Some(target.id())
            }
            None => None,
        };
        self.bound_target = id;
        self.target_binds.push(id);
        Ok(())
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn render_buffer_direct(
        &mut self,
        _scene: &Scene,
        camera: NodeId,
        material: &Material,
        _buffer: &GeometryBuffer,
        object: NodeId,
    ) -> RenderResult<()> {
        self.record(DrawEntry::Direct, camera, material, object);
        Ok(())
    }

    fn render_buffer(
        &mut self,
        _scene: &Scene,
        camera: NodeId,
        material: &Material,
        _buffer: &GeometryBuffer,
        object: NodeId,
    ) -> RenderResult<()> {
        self.record(DrawEntry::Grouped, camera, material, object);
        Ok(())
    }

    fn clear_color(&self) -> Color {
        self.clear_color
    }

    fn clear_alpha(&self) -> f32 {
        self.clear_alpha
    }

    fn is_auto_update_scene(&self) -> bool {
        self.auto_update_scene
    }
}
