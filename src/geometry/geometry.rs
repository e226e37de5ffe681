//! CPU-side mesh data.

use crate::core::Id;
use crate::material::MaterialRef;
use crate::math::{Sphere, Vec3};

/// A contiguous index range drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryGroup {
    /// First index.
    pub start: u32,
    /// Number of indices.
    pub count: u32,
    /// Index into the geometry's face materials, if any.
    pub material_index: Option<usize>,
}

/// Vertex and index data shared between meshes.
#[derive(Debug, Clone)]
pub struct Geometry {
    /// Unique ID.
    id: Id,
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Triangle indices. Empty means non-indexed triangles.
    pub indices: Vec<u32>,
    /// Morph target positions, each the same length as `positions`.
    pub morph_targets: Vec<Vec<[f32; 3]>>,
    /// Bone indices per vertex.
    pub skin_indices: Vec<[u32; 4]>,
    /// Bone weights per vertex.
    pub skin_weights: Vec<[f32; 4]>,
    /// Material groups. Empty means the geometry draws as one buffer.
    pub groups: Vec<GeometryGroup>,
    /// Face materials referenced by `GeometryGroup::material_index`.
    pub materials: Vec<MaterialRef>,
    /// Bounding sphere in local space.
    bounding_sphere: Option<Sphere>,
}

impl Geometry {
    /// Create a geometry and compute its bounding sphere.
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        let mut geometry = Self {
            id: Id::new(),
            positions,
            indices,
            morph_targets: Vec::new(),
            skin_indices: Vec::new(),
            skin_weights: Vec::new(),
            groups: Vec::new(),
            materials: Vec::new(),
            bounding_sphere: None,
        };
        geometry.compute_bounding_sphere();
        geometry
    }

    /// A single triangle in the XY plane.
    pub fn triangle() -> Self {
        Self::new(
            vec![[0.0, 0.5, 0.0], [-0.5, -0.5, 0.0], [0.5, -0.5, 0.0]],
            Vec::new(),
        )
    }

    /// An axis-aligned cube centered at the origin.
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        let positions = vec![
            [-h, -h, h],
            [h, -h, h],
            [h, h, h],
            [-h, h, h],
            [-h, -h, -h],
            [h, -h, -h],
            [h, h, -h],
            [-h, h, -h],
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2, 0, 2, 3, // +z
            5, 4, 7, 5, 7, 6, // -z
            1, 5, 6, 1, 6, 2, // +x
            4, 0, 3, 4, 3, 7, // -x
            3, 2, 6, 3, 6, 7, // +y
            4, 5, 1, 4, 1, 0, // -y
        ];
        Self::new(positions, indices)
    }

    /// Builder: split into material groups.
    pub fn with_groups(mut self, groups: Vec<GeometryGroup>, materials: Vec<MaterialRef>) -> Self {
        self.groups = groups;
        self.materials = materials;
        self
    }

    /// Builder: add morph targets.
    pub fn with_morph_targets(mut self, targets: Vec<Vec<[f32; 3]>>) -> Self {
        self.morph_targets = targets;
        self
    }

    /// Builder: add skinning attributes.
    pub fn with_skin(mut self, indices: Vec<[u32; 4]>, weights: Vec<[f32; 4]>) -> Self {
        self.skin_indices = indices;
        self.skin_weights = weights;
        self
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Whether any morph targets are present.
    #[inline]
    pub fn has_morph_targets(&self) -> bool {
        !self.morph_targets.is_empty()
    }

    /// Whether skinning attributes are present.
    #[inline]
    pub fn has_skin(&self) -> bool {
        !self.skin_indices.is_empty() && self.skin_indices.len() == self.skin_weights.len()
    }

    /// Number of indices drawn for the whole geometry.
    pub fn draw_count(&self) -> u32 {
        if self.indices.is_empty() {
            self.positions.len() as u32
        } else {
            self.indices.len() as u32
        }
    }

    /// Bounding sphere, if computed.
    #[inline]
    pub fn bounding_sphere(&self) -> Option<&Sphere> {
        self.bounding_sphere.as_ref()
    }

    /// Recompute the bounding sphere from the positions.
    pub fn compute_bounding_sphere(&mut self) {
        if self.positions.is_empty() {
            self.bounding_sphere = None;
            return;
        }
        let points: Vec<Vec3> = self.positions.iter().map(|p| Vec3::from_array(*p)).collect();
        self.bounding_sphere = Some(Sphere::from_points(&points));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_bounds() {
        let cube = Geometry::cube(2.0);
        let sphere = cube.bounding_sphere().unwrap();
        assert!(sphere.center.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!((sphere.radius - 3.0_f32.sqrt()).abs() < 1e-5);
        assert_eq!(cube.draw_count(), 36);
    }

    #[test]
    fn test_capabilities() {
        let g = Geometry::triangle();
        assert!(!g.has_morph_targets());
        assert!(!g.has_skin());
        assert_eq!(g.draw_count(), 3);

        let g = g
            .with_morph_targets(vec![vec![[0.0; 3]; 3]])
            .with_skin(vec![[0; 4]; 3], vec![[1.0, 0.0, 0.0, 0.0]; 3]);
        assert!(g.has_morph_targets());
        assert!(g.has_skin());
    }
}
