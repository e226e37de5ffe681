//! [`GraphicsContext`] over a wgpu device.

use std::sync::Arc;

use slotmap::SlotMap;

use super::mipmap::MipmapGenerator;
use super::GpuContext;
use crate::core::{
    Capability, CullFaceMode, FramebufferHandle, FrontFaceDirection, GraphicsContext, RasterState,
    RenderError, RenderResult, RenderbufferHandle, TextureHandle,
};
use crate::texture::{wgpu_format, TextureDescriptor};

/// Depth format of renderbuffers.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Depth and stencil format of renderbuffers that asked for stencil.
pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// A color texture plus the sampler the main pass reads it with.
pub struct GpuTexture {
    /// The texture, `layers` array layers deep.
    pub texture: wgpu::Texture,
    /// Whole-texture view for sampling (cube view for six layers).
    pub view: wgpu::TextureView,
    /// Sampler built from the descriptor's filters and wrapping.
    pub sampler: wgpu::Sampler,
    /// Descriptor the texture was created from.
    pub desc: TextureDescriptor,
}

/// Attachments a render pass draws into.
pub struct GpuFramebuffer {
    /// Single-layer, single-level color view.
    pub color: wgpu::TextureView,
    /// Depth view, if a renderbuffer was attached.
    pub depth: Option<wgpu::TextureView>,
    /// Color format.
    pub color_format: wgpu::TextureFormat,
    /// Depth format, if any.
    pub depth_format: Option<wgpu::TextureFormat>,
    /// Texture the color view belongs to.
    pub texture: TextureHandle,
}

/// A depth (and optional stencil) texture.
pub struct GpuRenderbuffer {
    /// Depth texture.
    pub texture: wgpu::Texture,
    /// Format of the texture.
    pub format: wgpu::TextureFormat,
}

/// GL-shaped state tracking plus arenas of wgpu objects.
///
/// Raster toggles only record state here; the renderer folds them into
/// pipeline selection at draw time.
pub struct WgpuGraphics {
    gpu: GpuContext,
    state: RasterState,
    textures: SlotMap<TextureHandle, GpuTexture>,
    framebuffers: SlotMap<FramebufferHandle, GpuFramebuffer>,
    renderbuffers: SlotMap<RenderbufferHandle, GpuRenderbuffer>,
    mipmaps: Option<MipmapGenerator>,
}

impl WgpuGraphics {
    /// Create an empty context on the given device.
    pub fn new(gpu: GpuContext) -> Self {
        Self {
            gpu,
            state: RasterState::default(),
            textures: SlotMap::with_key(),
            framebuffers: SlotMap::with_key(),
            renderbuffers: SlotMap::with_key(),
            mipmaps: None,
        }
    }

    /// The GPU device.
    #[inline]
    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.gpu.device
    }

    /// The command queue.
    #[inline]
    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.gpu.queue
    }

    /// Look up a texture.
    #[inline]
    pub fn texture(&self, handle: TextureHandle) -> Option<&GpuTexture> {
        self.textures.get(handle)
    }

    /// Look up a framebuffer.
    #[inline]
    pub fn framebuffer(&self, handle: FramebufferHandle) -> Option<&GpuFramebuffer> {
        self.framebuffers.get(handle)
    }

    /// Record whether draws test and write depth.
    #[inline]
    pub fn set_depth_test(&mut self, enabled: bool) {
        self.state.depth_test = enabled;
    }

    /// Number of live textures, framebuffers and renderbuffers.
    pub fn live_objects(&self) -> (usize, usize, usize) {
        (self.textures.len(), self.framebuffers.len(), self.renderbuffers.len())
    }

    fn check_size(&self, width: u32, height: u32) -> Result<(), String> {
        let max = self.gpu.device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 {
            Err("zero-sized".to_string())
        } else if width > max || height > max {
            Err(format!("exceeds device limit of {max}"))
        } else {
            Ok(())
        }
    }
}

impl GraphicsContext for WgpuGraphics {
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
        self.check_size(desc.width, desc.height)
            .map_err(|reason| RenderError::TextureAllocation {
                width: desc.width,
                height: desc.height,
                reason,
            })?;

        let device = &self.gpu.device;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Render Target Texture"),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: desc.layers,
            },
            mip_level_count: desc.mip_level_count(),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu_format(desc.format, desc.data_type),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Render Target View"),
            dimension: Some(if desc.layers == 6 {
                wgpu::TextureViewDimension::Cube
            } else {
                wgpu::TextureViewDimension::D2
            }),
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Render Target Sampler"),
            address_mode_u: desc.wrap_s.into(),
            address_mode_v: desc.wrap_t.into(),
            mag_filter: desc.mag_filter.wgpu_filter(),
            min_filter: desc.min_filter.wgpu_filter(),
            mipmap_filter: desc.min_filter.wgpu_mipmap_filter(),
            ..Default::default()
        });

        Ok(self.textures.insert(GpuTexture {
            texture,
            view,
            sampler,
            desc: *desc,
        }))
    }

    fn create_renderbuffer(
        &mut self,
        width: u32,
        height: u32,
        stencil: bool,
    ) -> RenderResult<RenderbufferHandle> {
        self.check_size(width, height)
            .map_err(RenderError::RenderbufferAllocation)?;

        let format = if stencil { DEPTH_STENCIL_FORMAT } else { DEPTH_FORMAT };
        let texture = self.gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Render Target Depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Ok(self.renderbuffers.insert(GpuRenderbuffer { texture, format }))
    }

    fn create_framebuffer(
        &mut self,
        color: TextureHandle,
        layer: u32,
        depth: Option<RenderbufferHandle>,
    ) -> RenderResult<FramebufferHandle> {
        let target = self
            .textures
            .get(color)
            .ok_or(RenderError::UnknownHandle { kind: "texture" })?;
        if layer >= target.desc.layers {
            return Err(RenderError::FramebufferAllocation(format!(
                "layer {layer} out of {}",
                target.desc.layers
            )));
        }

        let color_view = target.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Framebuffer Color"),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_mip_level: 0,
            mip_level_count: Some(1),
            base_array_layer: layer,
            array_layer_count: Some(1),
            ..Default::default()
        });
        let color_format = target.texture.format();

        let (depth_view, depth_format) = match depth {
            Some(handle) => {
                let renderbuffer = self
                    .renderbuffers
                    .get(handle)
                    .ok_or(RenderError::UnknownHandle { kind: "renderbuffer" })?;
                let view = renderbuffer
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                (Some(view), Some(renderbuffer.format))
            }
            None => (None, None),
        };

        Ok(self.framebuffers.insert(GpuFramebuffer {
            color: color_view,
            depth: depth_view,
            color_format,
            depth_format,
            texture: color,
        }))
    }

    fn generate_mipmap(&mut self, texture: TextureHandle) -> RenderResult<()> {
        let target = self
            .textures
            .get(texture)
            .ok_or(RenderError::UnknownHandle { kind: "texture" })?;

        let device = &self.gpu.device;
        let generator = self.mipmaps.get_or_insert_with(|| MipmapGenerator::new(device));
        if !generator.generate(device, &self.gpu.queue, &target.texture) {
            log::warn!(
                "Mipmaps not generated for {:?}: format cannot be filtered",
                target.texture.format()
            );
        }
        Ok(())
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        if let Some(gpu) = self.textures.remove(texture) {
            gpu.texture.destroy();
        }
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.framebuffers.remove(framebuffer);
    }

    fn delete_renderbuffer(&mut self, renderbuffer: RenderbufferHandle) {
        if let Some(gpu) = self.renderbuffers.remove(renderbuffer) {
            gpu.texture.destroy();
        }
    }
}
