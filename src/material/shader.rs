//! WGSL shader programs with named uniforms.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::math::{Mat4, Vec3, Vec4};

/// A uniform value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    /// Scalar.
    Float(f32),
    /// 3-vector.
    Vec3(Vec3),
    /// 4-vector.
    Vec4(Vec4),
    /// 4x4 matrix.
    Mat4(Mat4),
}

impl Uniform {
    /// Scalar value, if this is a float.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }
}

/// A shader program: WGSL source with `vs_main`/`fs_main` entry points plus
/// default uniform values.
///
/// Every program bound in a depth pass must use the depth binding interface:
/// group 0 binding 0 holds the per-draw `DepthUniforms` block, binding 1 the
/// bone matrices.
#[derive(Debug, Clone)]
pub struct Shader {
    name: Cow<'static, str>,
    source: Cow<'static, str>,
    uniforms: BTreeMap<&'static str, Uniform>,
}

impl Shader {
    /// Create a shader from WGSL source.
    pub fn new(name: impl Into<Cow<'static, str>>, source: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            uniforms: BTreeMap::new(),
        }
    }

    /// Packs fragment depth into an RGBA8 color.
    pub fn depth_rgba() -> Self {
        Self::new("DepthRGBA", include_str!("../shaders/depth_rgba.wgsl"))
    }

    /// Grey-scale linear depth between `mNear` and `mFar`.
    pub fn depth() -> Self {
        Self::new("Depth", include_str!("../shaders/depth.wgsl"))
            .with_uniform("mNear", Uniform::Float(1.0))
            .with_uniform("mFar", Uniform::Float(2000.0))
            .with_uniform("opacity", Uniform::Float(1.0))
    }

    /// Builder: set a uniform.
    pub fn with_uniform(mut self, name: &'static str, value: Uniform) -> Self {
        self.uniforms.insert(name, value);
        self
    }

    /// Program name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// WGSL source.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Look up a uniform.
    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.get(name)
    }

    /// Set a uniform.
    pub fn set_uniform(&mut self, name: &'static str, value: Uniform) {
        self.uniforms.insert(name, value);
    }

    /// Scalar uniform with a fallback.
    pub fn float_or(&self, name: &str, default: f32) -> f32 {
        self.uniform(name).and_then(Uniform::as_float).unwrap_or(default)
    }
}
