//! # Scene Module
//!
//! Arena-backed scene graph. Nodes live in a slot map owned by [`Scene`] and
//! refer to each other by [`NodeId`]; cameras, lights and meshes are all
//! nodes, distinguished by their [`ObjectKind`].

mod object3d;
mod scene;
mod transform;
mod visibility;

pub use object3d::{Object3D, ObjectKind};
pub use scene::Scene;
pub use transform::Transform;
pub use visibility::Visibility;

slotmap::new_key_type! {
    /// Handle to a node in a [`Scene`].
    pub struct NodeId;
}
