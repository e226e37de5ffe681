//! Spot light (cone-shaped).

/// Spot light payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    /// Falloff distance, 0 for none.
    pub distance: f32,
    /// Cone half angle in radians.
    pub angle: f32,
    /// Angular falloff exponent.
    pub exponent: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            distance: 0.0,
            angle: std::f32::consts::FRAC_PI_3,
            exponent: 10.0,
        }
    }
}
