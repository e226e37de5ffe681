//! Directional light (sun-like parallel rays) and its shadow cascades.

use crate::math::Vec3;
use crate::scene::NodeId;

/// Cascaded shadow configuration of a directional light.
///
/// The per-cascade arrays are indexed by cascade number and must hold at
/// least `count` entries. `near_z`/`far_z` are clip-space depths of the main
/// camera bounding each slice.
#[derive(Debug, Clone)]
pub struct ShadowCascade {
    /// Split the shadow into cascades.
    pub enabled: bool,
    /// Number of cascades.
    pub count: usize,
    /// Offset of the cascade pivot relative to the viewing camera.
    pub offset: Vec3,
    /// Per-cascade depth bias.
    pub bias: Vec<f32>,
    /// Per-cascade shadow map width.
    pub width: Vec<u32>,
    /// Per-cascade shadow map height.
    pub height: Vec<u32>,
    /// Per-cascade near clip depth.
    pub near_z: Vec<f32>,
    /// Per-cascade far clip depth.
    pub far_z: Vec<f32>,
    /// Virtual light node per cascade, filled on first use.
    array: Vec<Option<NodeId>>,
}

impl Default for ShadowCascade {
    fn default() -> Self {
        Self {
            enabled: false,
            count: 2,
            offset: Vec3::new(0.0, 0.0, -1000.0),
            bias: vec![0.0, 0.0, 0.0],
            width: vec![512, 512, 512],
            height: vec![512, 512, 512],
            near_z: vec![-1.000, 0.990, 0.998],
            far_z: vec![0.990, 0.998, 1.000],
            array: Vec::new(),
        }
    }
}

impl ShadowCascade {
    /// Virtual light registered for a cascade, if created.
    #[inline]
    pub fn virtual_light(&self, cascade: usize) -> Option<NodeId> {
        self.array.get(cascade).copied().flatten()
    }

    /// Register the virtual light of a cascade.
    pub fn set_virtual_light(&mut self, cascade: usize, light: NodeId) {
        if self.array.len() <= cascade {
            self.array.resize(cascade + 1, None);
        }
        self.array[cascade] = Some(light);
    }

    /// Every registered virtual light.
    pub fn virtual_lights(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.array.iter().flatten().copied()
    }
}

/// Directional light payload.
#[derive(Debug, Clone, Default)]
pub struct DirectionalLight {
    /// Shadow cascade settings.
    pub cascade: ShadowCascade,
}

impl DirectionalLight {
    /// Create a directional light with cascading enabled.
    pub fn cascaded(count: usize) -> Self {
        Self {
            cascade: ShadowCascade {
                enabled: true,
                count,
                ..ShadowCascade::default()
            },
        }
    }
}
