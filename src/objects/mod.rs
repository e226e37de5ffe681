//! Renderable objects module.
//!
//! Meshes and the per-frame render list entries built from them.

mod mesh;
mod renderable;

pub use mesh::{Mesh, Skeleton, MAX_BONES};
pub use renderable::RenderableEntry;
