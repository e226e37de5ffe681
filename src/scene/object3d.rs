//! Scene graph node.

use super::{NodeId, Transform, Visibility};
use crate::camera::Camera;
use crate::helpers::CameraHelper;
use crate::light::Light;
use crate::math::{Mat4, Vec3};
use crate::objects::Mesh;

/// What a scene node is, beyond its transform.
#[derive(Debug)]
pub enum ObjectKind {
    /// Plain grouping node.
    Group,
    /// Pivot that follows its parent's position and scale but keeps its own rotation.
    Gyroscope,
    /// Renderable mesh.
    Mesh(Mesh),
    /// Camera.
    Camera(Camera),
    /// Light source.
    Light(Light),
    /// Debug lines outlining a camera frustum.
    CameraHelper(CameraHelper),
}

impl ObjectKind {
    /// Short name of the variant, for logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Group => "Group",
            Self::Gyroscope => "Gyroscope",
            Self::Mesh(mesh) if mesh.is_skinned() => "SkinnedMesh",
            Self::Mesh(_) => "Mesh",
            Self::Camera(_) => "Camera",
            Self::Light(light) => light.kind.type_name(),
            Self::CameraHelper(_) => "CameraHelper",
        }
    }
}

/// A node in the scene graph.
#[derive(Debug)]
pub struct Object3D {
    /// Object name.
    name: String,
    /// Local transform.
    pub transform: Transform,
    /// Visibility and shadow flags.
    pub visibility: Visibility,
    /// Recompose the local matrix from `transform` on every world update.
    pub matrix_auto_update: bool,
    /// Local matrix.
    matrix: Mat4,
    /// World matrix.
    matrix_world: Mat4,
    /// Model-view matrix relative to the camera of the pass currently drawing it.
    pub model_view_matrix: Mat4,
    /// Parent node.
    pub(super) parent: Option<NodeId>,
    /// Child nodes.
    pub(super) children: Vec<NodeId>,
    /// Node payload.
    pub kind: ObjectKind,
}

impl Object3D {
    /// Create a node of the given kind.
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            name: String::new(),
            transform: Transform::new(),
            visibility: Visibility::new(),
            matrix_auto_update: true,
            matrix: Mat4::IDENTITY,
            matrix_world: Mat4::IDENTITY,
            model_view_matrix: Mat4::IDENTITY,
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    /// Create an empty grouping node.
    pub fn group() -> Self {
        Self::new(ObjectKind::Group)
    }

    /// Create a gyroscope pivot.
    pub fn gyroscope() -> Self {
        Self::new(ObjectKind::Gyroscope)
    }

    /// Wrap a mesh.
    pub fn mesh(mesh: Mesh) -> Self {
        Self::new(ObjectKind::Mesh(mesh))
    }

    /// Wrap a camera.
    pub fn camera(camera: Camera) -> Self {
        Self::new(ObjectKind::Camera(camera))
    }

    /// Wrap a light.
    pub fn light(light: Light) -> Self {
        Self::new(ObjectKind::Light(light))
    }

    /// Builder: set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder: set the local position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Builder: set the cast-shadow flag.
    pub fn with_cast_shadow(mut self, cast_shadow: bool) -> Self {
        self.visibility.cast_shadow = cast_shadow;
        self
    }

    /// Get the object name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the object name.
    #[inline]
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Local position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Set the local position.
    #[inline]
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    /// Whether the node is drawn.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visibility.visible
    }

    /// Show or hide the node.
    #[inline]
    pub fn set_visible(&mut self, visible: bool) {
        self.visibility.visible = visible;
    }

    /// Whether the node casts shadows.
    #[inline]
    pub fn casts_shadow(&self) -> bool {
        self.visibility.cast_shadow
    }

    /// Set the cast-shadow flag.
    #[inline]
    pub fn set_cast_shadow(&mut self, cast_shadow: bool) {
        self.visibility.cast_shadow = cast_shadow;
    }

    /// Local matrix as of the last world update.
    #[inline]
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// Replace the local matrix; only sticks when `matrix_auto_update` is off.
    #[inline]
    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.matrix = matrix;
    }

    /// World matrix as of the last world update.
    #[inline]
    pub fn matrix_world(&self) -> &Mat4 {
        &self.matrix_world
    }

    /// World-space position as of the last world update.
    #[inline]
    pub fn world_position(&self) -> Vec3 {
        self.matrix_world.w_axis.truncate()
    }

    /// Parent node, if attached.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Recompute local and world matrices given the parent's world matrix.
    pub(super) fn update_matrix_world(&mut self, parent_world: Option<&Mat4>) {
        if self.matrix_auto_update {
            self.matrix = self.transform.local_matrix();
        }

        self.matrix_world = match parent_world {
            Some(parent) => *parent * self.matrix,
            None => self.matrix,
        };

        if matches!(self.kind, ObjectKind::Gyroscope) && parent_world.is_some() {
            let (world_scale, _, world_translation) =
                self.matrix_world.to_scale_rotation_translation();
            let (_, local_rotation, _) = self.matrix.to_scale_rotation_translation();
            self.matrix_world = Mat4::from_scale_rotation_translation(
                world_scale,
                local_rotation,
                world_translation,
            );
        }

        if let ObjectKind::Camera(camera) = &mut self.kind {
            camera.set_matrix_world_inverse(self.matrix_world.inverse());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Quat;

    #[test]
    fn test_world_matrix_from_parent() {
        let parent = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let mut obj = Object3D::group().with_position(Vec3::new(0.0, 2.0, 0.0));
        obj.update_matrix_world(Some(&parent));
        assert!(obj.world_position().abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-6));
    }

    #[test]
    fn test_gyroscope_ignores_parent_rotation() {
        let parent = Mat4::from_rotation_translation(
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::new(0.0, 0.0, 10.0),
        );
        let mut gyro = Object3D::gyroscope().with_position(Vec3::new(0.0, 0.0, -5.0));
        gyro.update_matrix_world(Some(&parent));

        // Position still follows the rotated parent frame...
        assert!(gyro
            .world_position()
            .abs_diff_eq(Vec3::new(-5.0, 0.0, 10.0), 1e-5));
        // ...but orientation is the gyroscope's own (identity).
        let (_, rotation, _) = gyro.matrix_world().to_scale_rotation_translation();
        assert!(rotation.abs_diff_eq(Quat::IDENTITY, 1e-5));
    }

    #[test]
    fn test_manual_matrix_kept_without_auto_update() {
        let mut obj = Object3D::group();
        obj.matrix_auto_update = false;
        obj.set_matrix(Mat4::from_translation(Vec3::X));
        obj.update_matrix_world(None);
        assert!(obj.world_position().abs_diff_eq(Vec3::X, 1e-6));
    }
}
