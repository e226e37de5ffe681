//! # Penumbra - Shadow Mapping for a wgpu Scene Graph
//!
//! Penumbra renders shadow maps for a Three.js-style scene graph ahead of the
//! main color pass. Each shadow-casting light gets an off-screen depth target
//! rendered from its point of view, plus the matrix the main pass uses to look
//! that depth up.
//!
//! ## Features
//!
//! - **Scene**: Arena scene graph with gyroscope nodes and render lists
//! - **Lights**: Directional and spot shadows, cascaded directional splits
//! - **Shadows**: Pre-render plugin, cascade synchronizer, frustum fitter
//! - **Backend**: wgpu graphics context and depth-pass renderer
//!
//! ## Example
//!
//! ```ignore
//! use penumbra::prelude::*;
//!
//! let gpu = GpuContext::headless(wgpu::PowerPreference::HighPerformance).await?;
//! let mut renderer = WgpuRenderer::new(&gpu);
//!
//! let mut scene = Scene::new();
//! let camera = scene.add(Object3D::camera(Camera::perspective(50.0, 16.0 / 9.0, 0.1, 100.0)));
//! let sun = scene.add(Object3D::light(Light::directional(Color::WHITE, 1.0).with_shadows()));
//!
//! let mut shadows = ShadowMapPlugin::default();
//! shadows.render(&mut renderer, &mut scene, camera, 1280, 720)?;
//! renderer.flush()?;
//! ```

#![warn(missing_docs)]

pub mod math;
pub mod core;
pub mod scene;
pub mod geometry;
pub mod material;
pub mod camera;
pub mod texture;
pub mod light;
pub mod objects;
pub mod helpers;
pub mod shadows;
pub mod backend;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::backend::{GpuContext, WgpuGraphics, WgpuRenderer};
    pub use crate::camera::*;
    pub use crate::core::*;
    pub use crate::geometry::*;
    pub use crate::helpers::*;
    pub use crate::light::*;
    pub use crate::material::*;
    pub use crate::math::*;
    pub use crate::objects::*;
    pub use crate::scene::*;
    pub use crate::shadows::*;
    pub use crate::texture::*;
}

/// Install the panic hook that forwards panics to the browser console.
#[cfg(feature = "web")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = "Penumbra";
