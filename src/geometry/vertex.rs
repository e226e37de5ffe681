//! Vertex layout of the depth passes.

use bytemuck::{Pod, Zeroable};

use super::Geometry;

/// Number of morph targets the depth shaders blend.
pub const MAX_MORPH_TARGETS: usize = 4;

/// Interleaved vertex carrying everything the depth variants may read.
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct DepthVertex {
    /// Position in local space.
    pub position: [f32; 3],
    /// Positions of the first morph targets; zero when absent.
    pub morph: [[f32; 3]; MAX_MORPH_TARGETS],
    /// Bone indices, as floats.
    pub skin_index: [f32; 4],
    /// Bone weights.
    pub skin_weight: [f32; 4],
}

impl DepthVertex {
    /// Interleave a geometry's attributes.
    pub fn from_geometry(geometry: &Geometry) -> Vec<Self> {
        let skinned = geometry.has_skin();
        geometry
            .positions
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let mut morph = [[0.0; 3]; MAX_MORPH_TARGETS];
                for (slot, target) in morph.iter_mut().zip(&geometry.morph_targets) {
                    *slot = target.get(i).copied().unwrap_or(*position);
                }
                let (skin_index, skin_weight) = if skinned {
                    let idx = geometry.skin_indices[i];
                    (
                        [idx[0] as f32, idx[1] as f32, idx[2] as f32, idx[3] as f32],
                        geometry.skin_weights[i],
                    )
                } else {
                    ([0.0; 4], [0.0; 4])
                };
                Self {
                    position: *position,
                    morph,
                    skin_index,
                    skin_weight,
                }
            })
            .collect()
    }

    /// Get the vertex buffer layout for this vertex type.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x3,
        3 => Float32x3,
        4 => Float32x3,
        5 => Float32x4,
        6 => Float32x4,
    ];
}
