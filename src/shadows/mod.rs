//! Shadow mapping.
//!
//! [`ShadowMapPlugin`] is a pre-render pass that fills one depth map per
//! shadow-casting light. Cascaded directional lights are split into virtual
//! lights by the synchronizer in this module, and each cascade's orthographic
//! camera is fitted to its slice of the main camera frustum.
//!
//! # Example
//!
//! ```ignore
//! use penumbra::prelude::*;
//!
//! let mut plugin = ShadowMapPlugin::new(ShadowMapConfig::new().soft(false));
//!
//! let mut sun = Light::directional(Color::WHITE, 1.0).with_shadows();
//! sun.shadow = sun.shadow.with_map_size(1024, 1024);
//! let sun = scene.add(Object3D::light(sun));
//!
//! plugin.render(&mut renderer, &mut scene, camera, width, height)?;
//! ```

mod cascade;
mod fit;
mod shadow_config;
mod shadow_map;

pub use cascade::{create_virtual_light, update_virtual_light};
pub use fit::{fit_shadow_camera, FitScratch};
pub use shadow_config::ShadowMapConfig;
pub use shadow_map::ShadowMapPlugin;
