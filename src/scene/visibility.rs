//! Visibility settings for scene objects.

/// Visibility and shadow participation flags of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    /// Whether the object is drawn at all.
    pub visible: bool,
    /// Whether the object occludes light in shadow maps.
    pub cast_shadow: bool,
    /// Whether the object samples shadow maps in the main pass.
    pub receive_shadow: bool,
    /// Whether the object may be skipped by frustum tests.
    pub frustum_culled: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new()
    }
}

impl Visibility {
    /// Create new visibility settings with defaults.
    pub const fn new() -> Self {
        Self {
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
            frustum_culled: true,
        }
    }

    /// Whether the object takes part in shadow map rendering at all.
    #[inline]
    pub fn is_shadow_caster(&self) -> bool {
        self.visible && self.cast_shadow
    }
}
