//! Texture module: texture parameters and off-screen render targets.

mod params;
mod render_target;

pub use params::{
    wgpu_format, DataType, PixelFormat, TextureDescriptor, TextureFilter, TextureWrap,
};
pub use render_target::{
    RenderTarget, RenderTargetCube, RenderTargetOptions, RenderTargetTexture, CUBE_FACES,
};
