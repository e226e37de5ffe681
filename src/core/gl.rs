//! Low-level graphics context contract.
//!
//! The shadow passes drive GPU state through a small, GL-shaped interface:
//! a handful of fixed-function toggles plus creation and deletion of the
//! objects render targets are made of. Backends implement it over whatever
//! API they wrap; the wgpu backend turns the toggles into pipeline state.

use super::RenderResult;
use crate::texture::TextureDescriptor;
use serde::{Deserialize, Serialize};

slotmap::new_key_type! {
    /// Handle to a backend texture (2D or cube).
    pub struct TextureHandle;
    /// Handle to a backend framebuffer (color attachment plus optional depth).
    pub struct FramebufferHandle;
    /// Handle to a backend depth renderbuffer.
    pub struct RenderbufferHandle;
}

/// Fixed-function capabilities that can be toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Color blending.
    Blend,
    /// Face culling.
    CullFace,
    /// Depth testing.
    DepthTest,
}

/// Which faces get culled when culling is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CullFaceMode {
    /// Cull front faces.
    Front,
    /// Cull back faces.
    #[default]
    Back,
    /// Cull everything (only points and lines survive).
    FrontAndBack,
}

/// Winding order that defines a front face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FrontFaceDirection {
    /// Counter-clockwise.
    #[default]
    Ccw,
    /// Clockwise.
    Cw,
}

/// Fixed-function state as last set through a [`GraphicsContext`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterState {
    /// Clear color including alpha.
    pub clear_color: [f32; 4],
    /// Blending enabled.
    pub blend: bool,
    /// Face culling enabled.
    pub cull_face: bool,
    /// Culled faces.
    pub cull_face_mode: CullFaceMode,
    /// Front face winding.
    pub front_face: FrontFaceDirection,
    /// Depth testing enabled.
    pub depth_test: bool,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 0.0],
            blend: false,
            cull_face: false,
            cull_face_mode: CullFaceMode::Back,
            front_face: FrontFaceDirection::Ccw,
            depth_test: false,
        }
    }
}

impl RasterState {
    /// Set or clear a capability flag.
    pub fn set_capability(&mut self, cap: Capability, enabled: bool) {
        match cap {
            Capability::Blend => self.blend = enabled,
            Capability::CullFace => self.cull_face = enabled,
            Capability::DepthTest => self.depth_test = enabled,
        }
    }

    /// Whether a capability is currently enabled.
    pub fn is_enabled(&self, cap: Capability) -> bool {
        match cap {
            Capability::Blend => self.blend,
            Capability::CullFace => self.cull_face,
            Capability::DepthTest => self.depth_test,
        }
    }

    /// The face wgpu should cull for the current state, if any.
    pub fn wgpu_cull_mode(&self) -> Option<wgpu::Face> {
        if !self.cull_face {
            return None;
        }
        match self.cull_face_mode {
            CullFaceMode::Front => Some(wgpu::Face::Front),
            CullFaceMode::Back => Some(wgpu::Face::Back),
            // wgpu has no "cull both"; triangles would all be discarded anyway
            CullFaceMode::FrontAndBack => Some(wgpu::Face::Back),
        }
    }

    /// Front face winding as a wgpu enum.
    pub fn wgpu_front_face(&self) -> wgpu::FrontFace {
        match self.front_face {
            FrontFaceDirection::Ccw => wgpu::FrontFace::Ccw,
            FrontFaceDirection::Cw => wgpu::FrontFace::Cw,
        }
    }
}

/// GL-shaped access to the device.
pub trait GraphicsContext {
    /// Set the color used by subsequent clears.
    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32);

    /// Enable a capability.
    fn enable(&mut self, cap: Capability);

    /// Disable a capability.
    fn disable(&mut self, cap: Capability);

    /// Set the front face winding.
    fn front_face(&mut self, direction: FrontFaceDirection);

    /// Select which faces are culled.
    fn cull_face(&mut self, mode: CullFaceMode);

    /// Current fixed-function state.
    fn raster_state(&self) -> RasterState;

    /// Create a texture with storage for every layer described.
    fn create_texture(&mut self, desc: &TextureDescriptor) -> RenderResult<TextureHandle>;

    /// Create a depth (and optionally stencil) renderbuffer.
    fn create_renderbuffer(
        &mut self,
        width: u32,
        height: u32,
        stencil: bool,
    ) -> RenderResult<RenderbufferHandle>;

    /// Create a framebuffer rendering into `layer` of `color`, with an optional depth attachment.
    fn create_framebuffer(
        &mut self,
        color: TextureHandle,
        layer: u32,
        depth: Option<RenderbufferHandle>,
    ) -> RenderResult<FramebufferHandle>;

    /// Regenerate the mip chain of a texture.
    fn generate_mipmap(&mut self, texture: TextureHandle) -> RenderResult<()>;

    /// Release a texture.
    fn delete_texture(&mut self, texture: TextureHandle);

    /// Release a framebuffer.
    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Release a renderbuffer.
    fn delete_renderbuffer(&mut self, renderbuffer: RenderbufferHandle);
}
