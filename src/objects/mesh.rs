//! Mesh object combining geometry and material.

use std::sync::Arc;

use crate::core::Id;
use crate::geometry::Geometry;
use crate::material::MaterialRef;
use crate::math::{Mat4, Sphere};

/// Maximum number of bones a skinned mesh can drive.
pub const MAX_BONES: usize = 64;

/// Bone matrices of a skinned mesh, in mesh space.
#[derive(Debug, Clone)]
pub struct Skeleton {
    bone_matrices: Vec<Mat4>,
}

impl Skeleton {
    /// Create a skeleton in bind pose. Bone count is capped at [`MAX_BONES`].
    pub fn new(bone_count: usize) -> Self {
        let count = bone_count.min(MAX_BONES);
        if count < bone_count {
            log::warn!("Skeleton with {} bones truncated to {}", bone_count, MAX_BONES);
        }
        Self {
            bone_matrices: vec![Mat4::IDENTITY; count],
        }
    }

    /// Number of bones.
    #[inline]
    pub fn bone_count(&self) -> usize {
        self.bone_matrices.len()
    }

    /// Set one bone's skinning matrix. Out-of-range indices are ignored.
    pub fn set_bone_matrix(&mut self, bone: usize, matrix: Mat4) {
        if let Some(slot) = self.bone_matrices.get_mut(bone) {
            *slot = matrix;
        }
    }

    /// All skinning matrices.
    #[inline]
    pub fn bone_matrices(&self) -> &[Mat4] {
        &self.bone_matrices
    }
}

/// A mesh is a renderable object with geometry and material.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Unique identifier.
    id: Id,
    /// Geometry data.
    pub geometry: Arc<Geometry>,
    /// Surface material. `None` draws nothing in colour passes.
    pub material: Option<MaterialRef>,
    /// Replaces the built-in depth materials in shadow passes.
    pub custom_depth_material: Option<MaterialRef>,
    /// Present for skinned meshes.
    pub skeleton: Option<Skeleton>,
    /// Weights of the geometry's morph targets.
    pub morph_target_influences: Vec<f32>,
}

impl Mesh {
    /// Create a new mesh.
    pub fn new(geometry: Arc<Geometry>, material: MaterialRef) -> Self {
        let influences = vec![0.0; geometry.morph_targets.len()];
        Self {
            id: Id::new(),
            geometry,
            material: Some(material),
            custom_depth_material: None,
            skeleton: None,
            morph_target_influences: influences,
        }
    }

    /// Create a skinned mesh.
    pub fn skinned(geometry: Arc<Geometry>, material: MaterialRef, skeleton: Skeleton) -> Self {
        Self {
            skeleton: Some(skeleton),
            ..Self::new(geometry, material)
        }
    }

    /// Builder: set a custom depth material.
    pub fn with_custom_depth_material(mut self, material: MaterialRef) -> Self {
        self.custom_depth_material = Some(material);
        self
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Whether this mesh is skinned.
    #[inline]
    pub fn is_skinned(&self) -> bool {
        self.skeleton.is_some()
    }

    /// Whether the geometry carries morph targets.
    #[inline]
    pub fn has_morph_targets(&self) -> bool {
        self.geometry.has_morph_targets()
    }

    /// Bounding sphere in world space for the given world matrix.
    pub fn world_bounding_sphere(&self, matrix_world: &Mat4) -> Option<Sphere> {
        self.geometry
            .bounding_sphere()
            .map(|s| s.apply_matrix4(matrix_world))
    }
}
