//! Geometry module for vertex data.

mod buffer;
mod geometry;
mod vertex;

pub use buffer::GeometryBuffer;
pub use geometry::{Geometry, GeometryGroup};
pub use vertex::{DepthVertex, MAX_MORPH_TARGETS};
