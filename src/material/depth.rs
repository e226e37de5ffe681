//! Depth-only materials for shadow map passes.

use std::sync::Arc;

use super::{Material, MaterialRef, Shader};

/// The four precombined depth materials, one per {skinning, morph targets}
/// combination, all sharing the RGBA depth-packing shader.
#[derive(Debug, Clone)]
pub struct DepthMaterials {
    /// Static geometry.
    pub base: MaterialRef,
    /// Morph-target geometry.
    pub morph: MaterialRef,
    /// Skinned geometry.
    pub skin: MaterialRef,
    /// Skinned geometry with morph targets.
    pub morph_skin: MaterialRef,
}

impl Default for DepthMaterials {
    fn default() -> Self {
        Self::new()
    }
}

impl DepthMaterials {
    /// Build all four variants.
    pub fn new() -> Self {
        let variant = |name: &str, skinning: bool, morph_targets: bool| {
            let mut material = Material::shader(Shader::depth_rgba()).with_name(name);
            material.skinning = skinning;
            material.morph_targets = morph_targets;
            material.shadow_pass = true;
            Arc::new(material)
        };

        Self {
            base: variant("DepthRGBA", false, false),
            morph: variant("DepthRGBAMorph", false, true),
            skin: variant("DepthRGBASkin", true, false),
            morph_skin: variant("DepthRGBAMorphSkin", true, true),
        }
    }

    /// Pick the material a shadow caster is drawn with. A custom depth
    /// material always wins.
    pub fn select<'a>(
        &'a self,
        custom: Option<&'a MaterialRef>,
        skinned: bool,
        morphed: bool,
    ) -> &'a MaterialRef {
        if let Some(custom) = custom {
            return custom;
        }
        match (skinned, morphed) {
            (true, true) => &self.morph_skin,
            (true, false) => &self.skin,
            (false, true) => &self.morph,
            (false, false) => &self.base,
        }
    }
}
