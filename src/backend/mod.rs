//! # Backend Module
//!
//! wgpu implementations of [`GraphicsContext`](crate::core::GraphicsContext)
//! and [`Renderer`](crate::core::Renderer).
//!
//! Shadow maps are color textures holding packed or linear depth, so every
//! pass renders into an RGBA attachment backed by a depth renderbuffer.
//! GL-style clip depth is remapped to wgpu's `[0, 1]` range in the uniforms.

mod context;
mod graphics;
mod mipmap;
mod pipeline;
mod renderer;

pub use context::{ContextError, GpuContext};
pub use graphics::{
    GpuFramebuffer, GpuRenderbuffer, GpuTexture, WgpuGraphics, DEPTH_FORMAT,
    DEPTH_STENCIL_FORMAT,
};
pub use pipeline::{
    align_to, BoneUniforms, DepthUniforms, PipelineCache, PipelineKey, ShaderKey,
    CLIP_DEPTH_REMAP,
};
pub use renderer::WgpuRenderer;
