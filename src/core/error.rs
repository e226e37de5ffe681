//! Rendering errors.

use thiserror::Error;

/// Errors raised by graphics resource management and draw submission.
///
/// Shadow passes propagate these to the caller's render loop; per-light
/// configuration problems are logged and skipped instead.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The device refused to create a texture.
    #[error("Failed to allocate {width}x{height} texture: {reason}")]
    TextureAllocation {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Backend-specific reason.
        reason: String,
    },

    /// The device refused to create a framebuffer.
    #[error("Failed to allocate framebuffer: {0}")]
    FramebufferAllocation(String),

    /// The device refused to create a depth renderbuffer.
    #[error("Failed to allocate renderbuffer: {0}")]
    RenderbufferAllocation(String),

    /// A handle was used after it was deleted or with the wrong context.
    #[error("Unknown {kind} handle")]
    UnknownHandle {
        /// Resource kind ("texture", "framebuffer", "camera", ...).
        kind: &'static str,
    },

    /// Device-level validation or out-of-memory error reported by wgpu.
    #[error("GPU error: {0}")]
    Device(#[from] wgpu::Error),
}

/// Result alias for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
