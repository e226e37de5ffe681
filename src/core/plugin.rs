//! Render plugins hooked before or after the main pass.

use super::{RenderResult, Renderer};
use crate::scene::{NodeId, Scene};

/// When a plugin runs relative to the main color pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginType {
    /// Before the main pass (shadow maps, reflections).
    PreRender,
    /// After the main pass (lens flares, sprites).
    PostRender,
}

/// A render pass the renderer invokes once per frame.
pub trait Plugin {
    /// When this plugin runs.
    fn plugin_type(&self) -> PluginType;

    /// Disabled plugins are skipped entirely.
    fn is_enabled(&self) -> bool;

    /// Run the plugin for one frame.
    fn render(
        &mut self,
        renderer: &mut dyn Renderer,
        scene: &mut Scene,
        camera: NodeId,
        width: u32,
        height: u32,
    ) -> RenderResult<()>;
}
