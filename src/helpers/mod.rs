//! Visual helpers for debugging and visualization.

mod camera_helper;

pub use camera_helper::{CameraHelper, HelperVertex};
