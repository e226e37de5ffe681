//! Render list entries.

use std::cmp::Ordering;

use super::Mesh;
use crate::geometry::GeometryBuffer;
use crate::material::MaterialRef;
use crate::scene::NodeId;

/// One drawable buffer of a scene object, with its resolved material.
#[derive(Debug, Clone)]
pub struct RenderableEntry {
    /// Owning scene node.
    pub object: NodeId,
    /// Buffer to draw.
    pub buffer: GeometryBuffer,
    /// Material when drawn in the opaque pass.
    pub opaque: Option<MaterialRef>,
    /// Material when drawn in the transparent pass.
    pub transparent: Option<MaterialRef>,
    /// Included in the pass currently being drawn.
    pub render: bool,
    /// Depth used for sorting; larger is farther.
    pub z: f32,
}

impl RenderableEntry {
    /// Create an entry with no resolved material.
    pub fn new(object: NodeId, buffer: GeometryBuffer) -> Self {
        Self {
            object,
            buffer,
            opaque: None,
            transparent: None,
            render: false,
            z: 0.0,
        }
    }

    /// Resolve the mesh material for this buffer into the opaque or
    /// transparent slot. Face materials resolve through the group's material
    /// index; a missing material leaves the slots untouched.
    pub fn unroll_buffer_material(&mut self, mesh: &Mesh) {
        let Some(mesh_material) = &mesh.material else {
            return;
        };

        let material = if mesh_material.is_face() {
            match self.buffer.material_index() {
                Some(index) => mesh.geometry.materials.get(index),
                None => None,
            }
        } else {
            Some(mesh_material)
        };

        if let Some(material) = material {
            if material.transparent {
                self.transparent = Some(material.clone());
                self.opaque = None;
            } else {
                self.opaque = Some(material.clone());
                self.transparent = None;
            }
        }
    }

    /// Back-to-front ordering: farther entries first.
    pub fn back_to_front(a: &Self, b: &Self) -> Ordering {
        b.z.partial_cmp(&a.z).unwrap_or(Ordering::Equal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, GeometryGroup};
    use crate::material::Material;
    use slotmap::SlotMap;
    use std::sync::Arc;

    fn node() -> NodeId {
        let mut ids: SlotMap<NodeId, ()> = SlotMap::with_key();
        ids.insert(())
    }

    #[test]
    fn test_unroll_plain_material() {
        let mesh = Mesh::new(
            Arc::new(Geometry::triangle()),
            Arc::new(Material::basic().with_transparent(true)),
        );
        let buffer = GeometryBuffer::for_geometry(&mesh.geometry).remove(0);
        let mut entry = RenderableEntry::new(node(), buffer);
        entry.unroll_buffer_material(&mesh);
        assert!(entry.opaque.is_none());
        assert!(entry.transparent.is_some());
    }

    #[test]
    fn test_unroll_face_material() {
        let glass: Arc<Material> = Arc::new(Material::basic().with_transparent(true));
        let stone: Arc<Material> = Arc::new(Material::basic());
        let geometry = Arc::new(Geometry::cube(1.0).with_groups(
            vec![
                GeometryGroup { start: 0, count: 18, material_index: Some(1) },
                GeometryGroup { start: 18, count: 18, material_index: Some(0) },
            ],
            vec![glass.clone(), stone.clone()],
        ));
        let mesh = Mesh::new(geometry.clone(), Arc::new(Material::face()));

        let entries: Vec<_> = GeometryBuffer::for_geometry(&geometry)
            .into_iter()
            .map(|b| {
                let mut e = RenderableEntry::new(node(), b);
                e.unroll_buffer_material(&mesh);
                e
            })
            .collect();

        assert!(Arc::ptr_eq(entries[0].opaque.as_ref().unwrap(), &stone));
        assert!(Arc::ptr_eq(entries[1].transparent.as_ref().unwrap(), &glass));
        assert!(entries[1].opaque.is_none());
    }

    #[test]
    fn test_back_to_front() {
        let buffer = GeometryBuffer::for_geometry(&Arc::new(Geometry::triangle())).remove(0);
        let mut near = RenderableEntry::new(node(), buffer.clone());
        near.z = 0.1;
        let mut far = RenderableEntry::new(node(), buffer);
        far.z = 0.9;

        let mut list = vec![near, far];
        list.sort_by(RenderableEntry::back_to_front);
        assert_eq!(list[0].z, 0.9);
        assert_eq!(list[1].z, 0.1);
    }
}
