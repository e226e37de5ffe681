//! Lighting module.
//!
//! Every light is a [`Light`] node payload; what differs between variants is
//! captured by the closed [`LightKind`] enum. Shadow state lives in
//! [`LightShadow`] and is filled in lazily by the shadow map pass.

mod directional;
mod shadow;
mod spot;
mod virtual_light;

pub use directional::{DirectionalLight, ShadowCascade};
pub use shadow::LightShadow;
pub use spot::SpotLight;
pub use virtual_light::VirtualLight;

use crate::core::Id;
use crate::math::Color;
use crate::scene::NodeId;

/// Variant-specific light data.
#[derive(Debug, Clone)]
pub enum LightKind {
    /// Parallel rays, optionally split into shadow cascades.
    Directional(DirectionalLight),
    /// Cone from a point.
    Spot(SpotLight),
    /// One cascade slice of a directional light. Never registered with the scene.
    Virtual(VirtualLight),
    /// Omni-directional point light. Cannot cast shadow maps.
    Point {
        /// Falloff distance, 0 for none.
        distance: f32,
    },
    /// Uniform ambient term. Cannot cast shadow maps.
    Ambient,
}

impl LightKind {
    /// Short name of the variant, for logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Directional(_) => "DirectionalLight",
            Self::Spot(_) => "SpotLight",
            Self::Virtual(_) => "VirtualLight",
            Self::Point { .. } => "PointLight",
            Self::Ambient => "AmbientLight",
        }
    }
}

/// A light source.
#[derive(Debug)]
pub struct Light {
    /// Unique ID.
    id: Id,
    /// Light color.
    pub color: Color,
    /// Light intensity.
    pub intensity: f32,
    /// Whether this light renders a shadow map.
    pub cast_shadow: bool,
    /// Light only darkens (contributes shadow, no illumination).
    pub only_shadow: bool,
    /// Node the light points at. `None` aims at the world origin.
    pub target: Option<NodeId>,
    /// Shadow settings and lazily created shadow resources.
    pub shadow: LightShadow,
    /// Variant data.
    pub kind: LightKind,
}

impl Light {
    /// Create a light of the given kind.
    pub fn new(color: Color, intensity: f32, kind: LightKind) -> Self {
        Self {
            id: Id::new(),
            color,
            intensity,
            cast_shadow: false,
            only_shadow: false,
            target: None,
            shadow: LightShadow::default(),
            kind,
        }
    }

    /// Create a directional light.
    pub fn directional(color: Color, intensity: f32) -> Self {
        Self::new(color, intensity, LightKind::Directional(DirectionalLight::default()))
    }

    /// Create a spot light with default cone settings.
    pub fn spot(color: Color, intensity: f32) -> Self {
        Self::new(color, intensity, LightKind::Spot(SpotLight::default()))
    }

    /// Create a point light.
    pub fn point(color: Color, intensity: f32, distance: f32) -> Self {
        Self::new(color, intensity, LightKind::Point { distance })
    }

    /// Create an ambient light.
    pub fn ambient(color: Color) -> Self {
        Self::new(color, 1.0, LightKind::Ambient)
    }

    /// Create a virtual cascade light.
    pub fn virtual_light(color: Color) -> Self {
        Self::new(color, 1.0, LightKind::Virtual(VirtualLight::default()))
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Builder: enable shadow casting.
    pub fn with_shadows(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    /// Builder: set the target node.
    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }

    /// Whether this light's kind can produce a shadow camera.
    #[inline]
    pub fn supports_shadow_map(&self) -> bool {
        matches!(
            self.kind,
            LightKind::Directional(_) | LightKind::Spot(_) | LightKind::Virtual(_)
        )
    }

    /// Directional payload, if any.
    pub fn as_directional(&self) -> Option<&DirectionalLight> {
        match &self.kind {
            LightKind::Directional(d) => Some(d),
            _ => None,
        }
    }

    /// Directional payload, mutably.
    pub fn as_directional_mut(&mut self) -> Option<&mut DirectionalLight> {
        match &mut self.kind {
            LightKind::Directional(d) => Some(d),
            _ => None,
        }
    }

    /// Virtual payload, if any.
    pub fn as_virtual(&self) -> Option<&VirtualLight> {
        match &self.kind {
            LightKind::Virtual(v) => Some(v),
            _ => None,
        }
    }

    /// Virtual payload, mutably.
    pub fn as_virtual_mut(&mut self) -> Option<&mut VirtualLight> {
        match &mut self.kind {
            LightKind::Virtual(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_support_by_kind() {
        assert!(Light::directional(Color::WHITE, 1.0).supports_shadow_map());
        assert!(Light::spot(Color::WHITE, 1.0).supports_shadow_map());
        assert!(Light::virtual_light(Color::WHITE).supports_shadow_map());
        assert!(!Light::point(Color::WHITE, 1.0, 0.0).supports_shadow_map());
        assert!(!Light::ambient(Color::WHITE).supports_shadow_map());
    }

    #[test]
    fn test_defaults() {
        let light = Light::directional(Color::from_hex(0xffeedd), 1.0);
        assert!(!light.cast_shadow);
        assert!(light.target.is_none());
        assert_eq!(light.kind.type_name(), "DirectionalLight");
        assert!(light.with_shadows().cast_shadow);
    }
}
