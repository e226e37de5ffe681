//! Off-screen render targets.
//!
//! GPU objects are created on the first [`RenderTargetTexture::allocate`] and
//! kept until [`RenderTargetTexture::deallocate`]; nothing is released
//! implicitly on drop.

use super::params::{DataType, PixelFormat, TextureDescriptor, TextureFilter, TextureWrap};
use crate::core::{
    FramebufferHandle, GraphicsContext, Id, RenderResult, RenderbufferHandle, TextureHandle,
};
use crate::math::is_power_of_two;

/// Number of faces of a cube target.
pub const CUBE_FACES: usize = 6;

/// Render target settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTargetOptions {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Channel layout.
    pub format: PixelFormat,
    /// Channel storage.
    pub data_type: DataType,
    /// Minification filter.
    pub min_filter: TextureFilter,
    /// Magnification filter.
    pub mag_filter: TextureFilter,
    /// Horizontal wrapping.
    pub wrap_s: TextureWrap,
    /// Vertical wrapping.
    pub wrap_t: TextureWrap,
    /// Build mip levels after rendering.
    pub generate_mipmaps: bool,
    /// Attach a depth buffer.
    pub depth_buffer: bool,
    /// Give the depth buffer a stencil channel.
    pub stencil_buffer: bool,
}

impl RenderTargetOptions {
    /// Default options for a target of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgba,
            data_type: DataType::UnsignedByte,
            min_filter: TextureFilter::LinearMipmapLinear,
            mag_filter: TextureFilter::Linear,
            wrap_s: TextureWrap::ClampToEdge,
            wrap_t: TextureWrap::ClampToEdge,
            generate_mipmaps: true,
            depth_buffer: true,
            stencil_buffer: true,
        }
    }

    /// Builder: set both filters.
    pub fn with_filters(mut self, min: TextureFilter, mag: TextureFilter) -> Self {
        self.min_filter = min;
        self.mag_filter = mag;
        self
    }

    /// Builder: set the pixel format.
    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    /// Whether both dimensions are powers of two.
    #[inline]
    pub fn is_power_of_two(&self) -> bool {
        is_power_of_two(self.width) && is_power_of_two(self.height)
    }

    /// Whether mip levels are built for this target.
    #[inline]
    pub fn needs_mipmaps(&self) -> bool {
        self.generate_mipmaps && self.is_power_of_two() && self.min_filter.is_mipmap()
    }

    /// Texture description with the non-power-of-two fallbacks applied:
    /// wrapping clamps to edge and mip filters degrade to their base filter.
    pub fn texture_descriptor(&self, layers: u32) -> TextureDescriptor {
        let pot = self.is_power_of_two();
        let (wrap_s, wrap_t) = if pot {
            (self.wrap_s, self.wrap_t)
        } else {
            (TextureWrap::ClampToEdge, TextureWrap::ClampToEdge)
        };
        let (min_filter, mag_filter) = if pot {
            (self.min_filter, self.mag_filter)
        } else {
            (self.min_filter.without_mipmap(), self.mag_filter.without_mipmap())
        };

        TextureDescriptor {
            width: self.width,
            height: self.height,
            layers,
            format: self.format,
            data_type: self.data_type,
            min_filter,
            mag_filter,
            wrap_s,
            wrap_t,
            mipmaps: self.needs_mipmaps(),
        }
    }
}

/// Anything the renderer can bind as the current render target.
pub trait RenderTargetTexture {
    /// Unique ID.
    fn id(&self) -> Id;

    /// Settings.
    fn options(&self) -> &RenderTargetOptions;

    /// Width in texels.
    fn width(&self) -> u32 {
        self.options().width
    }

    /// Height in texels.
    fn height(&self) -> u32 {
        self.options().height
    }

    /// Whether GPU objects exist.
    fn is_allocated(&self) -> bool;

    /// Create GPU objects if they do not exist yet.
    fn allocate(&mut self, gl: &mut dyn GraphicsContext) -> RenderResult<()>;

    /// Release every GPU object. The target may be allocated again afterwards.
    fn deallocate(&mut self, gl: &mut dyn GraphicsContext);

    /// Color texture.
    fn texture(&self) -> Option<TextureHandle>;

    /// Framebuffer draws currently go to.
    fn framebuffer(&self) -> Option<FramebufferHandle>;

    /// Rebuild mip levels after rendering, when enabled.
    fn update_mipmap(&self, gl: &mut dyn GraphicsContext) -> RenderResult<()> {
        match self.texture() {
            Some(texture) if self.options().needs_mipmaps() => gl.generate_mipmap(texture),
            _ => Ok(()),
        }
    }
}

/// 2D render target.
#[derive(Debug)]
pub struct RenderTarget {
    id: Id,
    options: RenderTargetOptions,
    texture: Option<TextureHandle>,
    framebuffer: Option<FramebufferHandle>,
    renderbuffer: Option<RenderbufferHandle>,
}

impl RenderTarget {
    /// Create an unallocated target.
    pub fn new(options: RenderTargetOptions) -> Self {
        Self {
            id: Id::new(),
            options,
            texture: None,
            framebuffer: None,
            renderbuffer: None,
        }
    }

    /// Depth renderbuffer, if allocated.
    #[inline]
    pub fn renderbuffer(&self) -> Option<RenderbufferHandle> {
        self.renderbuffer
    }
}

impl RenderTargetTexture for RenderTarget {
    fn id(&self) -> Id {
        self.id
    }

    fn options(&self) -> &RenderTargetOptions {
        &self.options
    }

    fn is_allocated(&self) -> bool {
        self.framebuffer.is_some()
    }

    fn allocate(&mut self, gl: &mut dyn GraphicsContext) -> RenderResult<()> {
        if self.framebuffer.is_some() {
            return Ok(());
        }

        let texture = gl.create_texture(&self.options.texture_descriptor(1))?;
        let renderbuffer = if self.options.depth_buffer {
            match gl.create_renderbuffer(
                self.options.width,
                self.options.height,
                self.options.stencil_buffer,
            ) {
                Ok(renderbuffer) => Some(renderbuffer),
                Err(err) => {
                    release(gl, texture, &[], &[]);
                    return Err(err);
                }
            }
        } else {
            None
        };
        let framebuffer = match gl.create_framebuffer(texture, 0, renderbuffer) {
            Ok(framebuffer) => framebuffer,
            Err(err) => {
                release(gl, texture, &[], renderbuffer.as_slice());
                return Err(err);
            }
        };

        log::trace!(
            "Allocated render target {} ({}x{})",
            self.id,
            self.options.width,
            self.options.height
        );

        self.texture = Some(texture);
        self.renderbuffer = renderbuffer;
        self.framebuffer = Some(framebuffer);

        self.update_mipmap(gl)
    }

    fn deallocate(&mut self, gl: &mut dyn GraphicsContext) {
        let Some(texture) = self.texture.take() else {
            return;
        };
        release(
            gl,
            texture,
            self.framebuffer.take().as_slice(),
            self.renderbuffer.take().as_slice(),
        );
        log::trace!("Released render target {}", self.id);
    }

    fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    fn framebuffer(&self) -> Option<FramebufferHandle> {
        self.framebuffer
    }
}

/// Cube render target: one framebuffer and depth buffer per face.
#[derive(Debug)]
pub struct RenderTargetCube {
    id: Id,
    options: RenderTargetOptions,
    /// Face subsequent draws go to, 0..6 (+X, -X, +Y, -Y, +Z, -Z).
    pub active_cube_face: usize,
    texture: Option<TextureHandle>,
    framebuffers: Vec<FramebufferHandle>,
    renderbuffers: Vec<RenderbufferHandle>,
}

impl RenderTargetCube {
    /// Create an unallocated cube target.
    pub fn new(options: RenderTargetOptions) -> Self {
        Self {
            id: Id::new(),
            options,
            active_cube_face: 0,
            texture: None,
            framebuffers: Vec::new(),
            renderbuffers: Vec::new(),
        }
    }

    /// Framebuffers of all faces.
    #[inline]
    pub fn framebuffers(&self) -> &[FramebufferHandle] {
        &self.framebuffers
    }
}

impl RenderTargetTexture for RenderTargetCube {
    fn id(&self) -> Id {
        self.id
    }

    fn options(&self) -> &RenderTargetOptions {
        &self.options
    }

    fn is_allocated(&self) -> bool {
        !self.framebuffers.is_empty()
    }

    fn allocate(&mut self, gl: &mut dyn GraphicsContext) -> RenderResult<()> {
        if !self.framebuffers.is_empty() {
            return Ok(());
        }

        let texture = gl.create_texture(&self.options.texture_descriptor(CUBE_FACES as u32))?;
        let mut framebuffers = Vec::with_capacity(CUBE_FACES);
        let mut renderbuffers = Vec::with_capacity(CUBE_FACES);
        if let Err(err) =
            build_cube_faces(gl, texture, &self.options, &mut framebuffers, &mut renderbuffers)
        {
            release(gl, texture, &framebuffers, &renderbuffers);
            return Err(err);
        }

        self.texture = Some(texture);
        self.framebuffers = framebuffers;
        self.renderbuffers = renderbuffers;

        log::trace!(
            "Allocated cube render target {} ({}x{})",
            self.id,
            self.options.width,
            self.options.height
        );

        self.update_mipmap(gl)
    }

    fn deallocate(&mut self, gl: &mut dyn GraphicsContext) {
        let Some(texture) = self.texture.take() else {
            return;
        };
        release(gl, texture, &self.framebuffers, &self.renderbuffers);
        self.framebuffers.clear();
        self.renderbuffers.clear();
        log::trace!("Released cube render target {}", self.id);
    }

    fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    fn framebuffer(&self) -> Option<FramebufferHandle> {
        self.framebuffers.get(self.active_cube_face).copied()
    }
}

/// Create a framebuffer and depth buffer per face, pushing handles as they succeed.
fn build_cube_faces(
    gl: &mut dyn GraphicsContext,
    texture: TextureHandle,
    options: &RenderTargetOptions,
    framebuffers: &mut Vec<FramebufferHandle>,
    renderbuffers: &mut Vec<RenderbufferHandle>,
) -> RenderResult<()> {
    for face in 0..CUBE_FACES {
        let renderbuffer =
            gl.create_renderbuffer(options.width, options.height, options.stencil_buffer)?;
        renderbuffers.push(renderbuffer);
        framebuffers.push(gl.create_framebuffer(texture, face as u32, Some(renderbuffer))?);
    }
    Ok(())
}

fn release(
    gl: &mut dyn GraphicsContext,
    texture: TextureHandle,
    framebuffers: &[FramebufferHandle],
    renderbuffers: &[RenderbufferHandle],
) {
    gl.delete_texture(texture);
    for framebuffer in framebuffers {
        gl.delete_framebuffer(*framebuffer);
    }
    for renderbuffer in renderbuffers {
        gl.delete_renderbuffer(*renderbuffer);
    }
}
