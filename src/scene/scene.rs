//! Scene container - the root of the scene graph.

use std::ops::{Index, IndexMut};

use slotmap::SlotMap;

use super::{NodeId, Object3D, ObjectKind};
use crate::camera::Camera;
use crate::geometry::GeometryBuffer;
use crate::light::{Light, LightKind};
use crate::math::{Mat4, Vec3};
use crate::objects::{Mesh, RenderableEntry};

/// The scene - owner of every node plus the per-frame light and render lists.
pub struct Scene {
    /// Scene name.
    name: String,
    /// Node arena.
    nodes: SlotMap<NodeId, Object3D>,
    /// Top-level nodes, in insertion order.
    roots: Vec<NodeId>,
    /// Light nodes in registration order. Virtual cascade lights never appear here.
    lights: Vec<NodeId>,
    /// One entry per drawable geometry buffer.
    render_list: Vec<RenderableEntry>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self {
            name: "Scene".to_string(),
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
            lights: Vec::new(),
            render_list: Vec::new(),
        }
    }

    /// Get the scene name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the scene name.
    #[inline]
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Add a top-level node.
    pub fn add(&mut self, object: Object3D) -> NodeId {
        let id = self.insert(object);
        self.roots.push(id);
        id
    }

    /// Add a node as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, object: Object3D) -> NodeId {
        let id = self.insert(object);
        self.link(parent, id);
        id
    }

    /// Move an existing node under `parent`, detaching it from wherever it was.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.is_ancestor(child, parent) {
            log::warn!("Refusing to attach {:?} below itself", child);
            return;
        }
        self.detach(child);
        self.link(parent, child);
    }

    /// Remove a node and its whole subtree. Returns the removed node.
    pub fn remove(&mut self, id: NodeId) -> Option<Object3D> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        self.detach(id);

        let mut doomed = Vec::new();
        self.collect_subtree(id, &mut doomed);

        self.lights.retain(|l| !doomed.contains(l));
        self.render_list.retain(|e| !doomed.contains(&e.object));

        let mut removed = None;
        for node in doomed {
            let object = self.nodes.remove(node);
            if node == id {
                removed = object;
            }
        }
        removed
    }

    /// Whether `id` refers to a live node.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Get a node.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Object3D> {
        self.nodes.get(id)
    }

    /// Get a node mutably.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Object3D> {
        self.nodes.get_mut(id)
    }

    /// Camera payload of a node, if it is a camera.
    pub fn camera(&self, id: NodeId) -> Option<&Camera> {
        match &self.nodes.get(id)?.kind {
            ObjectKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Camera payload of a node, mutably.
    pub fn camera_mut(&mut self, id: NodeId) -> Option<&mut Camera> {
        match &mut self.nodes.get_mut(id)?.kind {
            ObjectKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Light payload of a node, if it is a light.
    pub fn light(&self, id: NodeId) -> Option<&Light> {
        match &self.nodes.get(id)?.kind {
            ObjectKind::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Light payload of a node, mutably.
    pub fn light_mut(&mut self, id: NodeId) -> Option<&mut Light> {
        match &mut self.nodes.get_mut(id)?.kind {
            ObjectKind::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Mesh payload of a node, if it is a mesh.
    pub fn mesh(&self, id: NodeId) -> Option<&Mesh> {
        match &self.nodes.get(id)?.kind {
            ObjectKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Top-level nodes.
    #[inline]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Registered scene lights, in order.
    #[inline]
    pub fn lights(&self) -> &[NodeId] {
        &self.lights
    }

    /// Current render list.
    #[inline]
    pub fn render_list(&self) -> &[RenderableEntry] {
        &self.render_list
    }

    /// Current render list, mutably.
    #[inline]
    pub fn render_list_mut(&mut self) -> &mut [RenderableEntry] {
        &mut self.render_list
    }

    /// Iterate over every node.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Object3D)> {
        self.nodes.iter()
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rotate a node so it faces a point given in its parent's space.
    /// Cameras aim their -Z axis at the target, everything else +Z.
    pub fn look_at(&mut self, id: NodeId, target: Vec3) {
        let node = &mut self.nodes[id];
        let negative_z = matches!(node.kind, ObjectKind::Camera(_));
        node.transform.look_at(target, negative_z);
    }

    /// World-space position of a node as of the last world update.
    #[inline]
    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.nodes[id].world_position()
    }

    /// Recompute every node's world matrix, parents before children.
    pub fn update_matrix_world(&mut self) {
        for i in 0..self.roots.len() {
            let root = self.roots[i];
            self.update_subtree(root, None);
        }
    }

    /// Recompute world matrices of one node and its descendants, using the
    /// parent's current world matrix.
    pub fn update_node_matrix_world(&mut self, id: NodeId) {
        let parent_world = self.nodes[id].parent.map(|p| *self.nodes[p].matrix_world());
        self.update_subtree(id, parent_world);
    }

    /// Rebuild the render list: one entry per geometry buffer of every mesh.
    pub fn refresh_render_list(&mut self) {
        let mut list = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if let ObjectKind::Mesh(mesh) = &node.kind {
                for buffer in GeometryBuffer::for_geometry(&mesh.geometry) {
                    let mut entry = RenderableEntry::new(id, buffer);
                    entry.unroll_buffer_material(mesh);
                    list.push(entry);
                }
            }
            stack.extend(node.children.iter().rev().copied());
        }

        log::trace!("Render list rebuilt with {} entries", list.len());
        self.render_list = list;
    }

    /// Sort the render list back to front as seen from `camera`.
    pub fn sort_render_list(&mut self, camera: NodeId) {
        let Some(cam) = self.camera(camera) else {
            log::warn!("sort_render_list called with a non-camera node");
            return;
        };
        let view_projection: Mat4 = *cam.projection_matrix() * *cam.matrix_world_inverse();

        for entry in &mut self.render_list {
            let position = self.nodes[entry.object].world_position();
            entry.z = view_projection.project_point3(position).z;
        }
        self.render_list.sort_by(RenderableEntry::back_to_front);
    }

    fn insert(&mut self, object: Object3D) -> NodeId {
        let registers = matches!(
            &object.kind,
            ObjectKind::Light(light) if !matches!(light.kind, LightKind::Virtual(_))
        );
        let id = self.nodes.insert(object);
        if registers {
            self.lights.push(id);
        }
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    fn detach(&mut self, id: NodeId) {
        match self.nodes[id].parent.take() {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(parent) {
                    p.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        while let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }

    fn collect_subtree(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for child in &self.nodes[id].children {
            self.collect_subtree(*child, out);
        }
    }

    fn update_subtree(&mut self, id: NodeId, parent_world: Option<Mat4>) {
        let mut stack = vec![(id, parent_world)];
        while let Some((node_id, parent_world)) = stack.pop() {
            let node = &mut self.nodes[node_id];
            node.update_matrix_world(parent_world.as_ref());
            let world = *node.matrix_world();
            stack.extend(node.children.iter().map(|c| (*c, Some(world))));
        }
    }
}

impl Index<NodeId> for Scene {
    type Output = Object3D;

    fn index(&self, id: NodeId) -> &Object3D {
        &self.nodes[id]
    }
}

impl IndexMut<NodeId> for Scene {
    fn index_mut(&mut self, id: NodeId) -> &mut Object3D {
        &mut self.nodes[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::material::Material;
    use std::sync::Arc;

    fn mesh_object(z: f32) -> Object3D {
        let geometry = Arc::new(Geometry::triangle());
        let material = Arc::new(Material::basic());
        Object3D::mesh(Mesh::new(geometry, material)).with_position(Vec3::new(0.0, 0.0, z))
    }

    #[test]
    fn test_lights_registered_on_add() {
        let mut scene = Scene::new();
        let sun = scene.add(Object3D::light(Light::directional(Default::default(), 1.0)));
        let group = scene.add(Object3D::group());
        let lamp = scene.add_child(group, Object3D::light(Light::spot(Default::default(), 1.0)));
        scene.add(Object3D::light(Light::virtual_light(Default::default())));

        assert_eq!(scene.lights(), &[sun, lamp]);
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut scene = Scene::new();
        let group = scene.add(Object3D::group());
        let child = scene.add_child(group, Object3D::group());
        let lamp = scene.add_child(child, Object3D::light(Light::spot(Default::default(), 1.0)));

        assert!(scene.remove(group).is_some());
        assert!(!scene.contains(child));
        assert!(!scene.contains(lamp));
        assert!(scene.lights().is_empty());
        assert!(scene.roots().is_empty());
    }

    #[test]
    fn test_attach_moves_node() {
        let mut scene = Scene::new();
        let a = scene.add(Object3D::group().with_position(Vec3::X));
        let b = scene.add(Object3D::group());
        scene.attach(a, b);
        assert_eq!(scene[b].parent(), Some(a));
        assert_eq!(scene.roots(), &[a]);

        // cannot attach a node below its own descendant
        scene.attach(b, a);
        assert_eq!(scene[a].parent(), None);

        scene.update_matrix_world();
        assert!(scene.world_position(b).abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn test_camera_inverse_follows_world_update() {
        let mut scene = Scene::new();
        let cam = scene.add(
            Object3D::camera(Camera::perspective(60.0, 1.0, 1.0, 100.0))
                .with_position(Vec3::new(0.0, 0.0, 10.0)),
        );
        scene.update_matrix_world();
        let inverse = *scene.camera(cam).unwrap().matrix_world_inverse();
        assert!(inverse
            .transform_point3(Vec3::new(0.0, 0.0, 10.0))
            .abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn test_render_list_sorted_back_to_front() {
        let mut scene = Scene::new();
        let near = scene.add(mesh_object(-2.0));
        let far = scene.add(mesh_object(-50.0));
        let cam = scene.add(Object3D::camera(Camera::perspective(60.0, 1.0, 1.0, 100.0)));

        scene.update_matrix_world();
        scene.refresh_render_list();
        assert_eq!(scene.render_list().len(), 2);

        scene.sort_render_list(cam);
        assert_eq!(scene.render_list()[0].object, far);
        assert_eq!(scene.render_list()[1].object, near);
    }
}
