//! Shadow map plugin configuration.

use serde::{Deserialize, Serialize};

/// Toggles of the shadow map plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowMapConfig {
    /// Plugin runs at all.
    pub enabled: bool,
    /// Re-render shadow maps every frame. When off, last frame's maps are kept.
    pub auto_update: bool,
    /// Main pass filters shadow lookups.
    pub soft: bool,
    /// Cull caster front faces instead of back faces during depth passes.
    pub cull_front_faces: bool,
    /// Main pass tints cascades for debugging.
    pub debug: bool,
    /// Main pass samples cascaded maps.
    pub cascade: bool,
}

impl Default for ShadowMapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_update: true,
            soft: true,
            cull_front_faces: true,
            debug: false,
            cascade: false,
        }
    }
}

impl ShadowMapConfig {
    /// Create a new configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the plugin is enabled.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set per-frame updates.
    pub fn auto_update(mut self, auto_update: bool) -> Self {
        self.auto_update = auto_update;
        self
    }

    /// Set soft shadows.
    pub fn soft(mut self, soft: bool) -> Self {
        self.soft = soft;
        self
    }

    /// Set front face culling of casters.
    pub fn cull_front_faces(mut self, cull: bool) -> Self {
        self.cull_front_faces = cull;
        self
    }

    /// Set cascade debug tinting.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set cascaded sampling.
    pub fn cascade(mut self, cascade: bool) -> Self {
        self.cascade = cascade;
        self
    }

    /// Whether the depth passes run this frame.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.enabled && self.auto_update
    }

    /// Preprocessor defines for the main colour pass shaders.
    pub fn shader_defines(&self) -> Vec<&'static str> {
        if !self.enabled {
            return Vec::new();
        }
        let mut defines = vec!["SHADOWMAP_ENABLED"];
        if self.soft {
            defines.push("SHADOWMAP_SOFT");
        }
        if self.debug {
            defines.push("SHADOWMAP_DEBUG");
        }
        if self.cascade {
            defines.push("SHADOWMAP_CASCADE");
        }
        defines
    }
}
