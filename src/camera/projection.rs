//! Projection parameters.

use crate::math::{consts::DEG2RAD, Mat4};
use serde::{Deserialize, Serialize};

/// Perspective or orthographic projection, in GL clip conventions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// Perspective frustum.
    Perspective {
        /// Vertical field of view in degrees.
        fov: f32,
        /// Width over height.
        aspect: f32,
        /// Near plane distance.
        near: f32,
        /// Far plane distance.
        far: f32,
    },
    /// Orthographic box.
    Orthographic {
        /// Left plane.
        left: f32,
        /// Right plane.
        right: f32,
        /// Top plane.
        top: f32,
        /// Bottom plane.
        bottom: f32,
        /// Near plane distance.
        near: f32,
        /// Far plane distance.
        far: f32,
    },
}

impl Projection {
    /// Near plane distance.
    pub fn near(&self) -> f32 {
        match *self {
            Self::Perspective { near, .. } | Self::Orthographic { near, .. } => near,
        }
    }

    /// Far plane distance.
    pub fn far(&self) -> f32 {
        match *self {
            Self::Perspective { far, .. } | Self::Orthographic { far, .. } => far,
        }
    }

    /// Build the projection matrix (clip Z in [-1, 1]).
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Self::Perspective {
                fov,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh_gl(fov * DEG2RAD, aspect, near, far),
            Self::Orthographic {
                left,
                right,
                top,
                bottom,
                near,
                far,
            } => Mat4::orthographic_rh_gl(left, right, bottom, top, near, far),
        }
    }
}
