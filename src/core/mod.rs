//! # Core Module
//!
//! Identifiers, errors, and the contracts render plugins use to talk to a
//! renderer and its graphics context.

mod error;
mod gl;
mod id;
mod plugin;
mod renderer;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{RenderError, RenderResult};
pub use gl::{
    Capability, CullFaceMode, FramebufferHandle, FrontFaceDirection, GraphicsContext,
    RasterState, RenderbufferHandle, TextureHandle,
};
pub use id::Id;
pub use plugin::{Plugin, PluginType};
pub use renderer::{RenderInfo, Renderer};
