//! Material module.
//!
//! Materials here only carry what draw submission needs to know: blending,
//! which vertex features the shader consumes, and an optional WGSL program.

mod depth;
mod shader;

pub use depth::DepthMaterials;
pub use shader::{Shader, Uniform};

use std::sync::Arc;

use crate::core::Id;
use crate::math::Color;

/// Shared material handle.
pub type MaterialRef = Arc<Material>;

/// Which faces a material renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    /// Front faces only.
    #[default]
    Front,
    /// Back faces only.
    Back,
    /// Both faces.
    Double,
}

/// Material variants.
#[derive(Debug, Clone)]
pub enum MaterialKind {
    /// Flat color.
    Basic {
        /// Surface color.
        color: Color,
    },
    /// Per-group materials taken from the geometry's face material list.
    Face,
    /// Custom WGSL program.
    Shader(Shader),
}

/// A material.
#[derive(Debug, Clone)]
pub struct Material {
    /// Unique ID.
    id: Id,
    /// Material name.
    pub name: String,
    /// Variant data.
    pub kind: MaterialKind,
    /// Drawn in the transparent pass.
    pub transparent: bool,
    /// Opacity, 0..1.
    pub opacity: f32,
    /// Shader applies skeletal skinning.
    pub skinning: bool,
    /// Shader blends morph targets.
    pub morph_targets: bool,
    /// Material is used while rendering shadow maps.
    pub shadow_pass: bool,
    /// Rendered faces.
    pub side: Side,
}

impl Material {
    /// Create a material of the given kind.
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            id: Id::new(),
            name: String::new(),
            kind,
            transparent: false,
            opacity: 1.0,
            skinning: false,
            morph_targets: false,
            shadow_pass: false,
            side: Side::Front,
        }
    }

    /// White flat-color material.
    pub fn basic() -> Self {
        Self::new(MaterialKind::Basic {
            color: Color::WHITE,
        })
    }

    /// Material resolving to the geometry's per-group materials.
    pub fn face() -> Self {
        Self::new(MaterialKind::Face)
    }

    /// Material running a custom shader.
    pub fn shader(shader: Shader) -> Self {
        let name = shader.name().to_string();
        Self::new(MaterialKind::Shader(shader)).with_name(name)
    }

    /// Builder: set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder: mark as transparent.
    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Whether this material defers to the geometry's face materials.
    #[inline]
    pub fn is_face(&self) -> bool {
        matches!(self.kind, MaterialKind::Face)
    }

    /// Custom shader, if any.
    pub fn as_shader(&self) -> Option<&Shader> {
        match &self.kind {
            MaterialKind::Shader(shader) => Some(shader),
            _ => None,
        }
    }
}
