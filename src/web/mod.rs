//! Web bindings for shadow map settings.
//!
//! Exposes the plugin configuration to JavaScript so page controls can
//! toggle shadows without going through the Rust API.

use wasm_bindgen::prelude::*;

use crate::shadows::ShadowMapConfig;

/// Shadow map settings exposed to JavaScript.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadowSettings {
    config: ShadowMapConfig,
}

#[wasm_bindgen]
impl ShadowSettings {
    /// Default settings: enabled, updated every frame, soft, front faces culled.
    #[wasm_bindgen(constructor)]
    pub fn new() -> ShadowSettings {
        Self::default()
    }

    /// Plugin runs at all.
    #[wasm_bindgen(getter)]
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Set whether the plugin runs.
    #[wasm_bindgen(setter)]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    /// Re-render maps every frame.
    #[wasm_bindgen(getter, js_name = autoUpdate)]
    pub fn auto_update(&self) -> bool {
        self.config.auto_update
    }

    /// Set per-frame updates.
    #[wasm_bindgen(setter, js_name = autoUpdate)]
    pub fn set_auto_update(&mut self, auto_update: bool) {
        self.config.auto_update = auto_update;
    }

    /// Soft shadow lookups.
    #[wasm_bindgen(getter)]
    pub fn soft(&self) -> bool {
        self.config.soft
    }

    /// Set soft shadow lookups.
    #[wasm_bindgen(setter)]
    pub fn set_soft(&mut self, soft: bool) {
        self.config.soft = soft;
    }

    /// Casters render back faces into the map.
    #[wasm_bindgen(getter, js_name = cullFrontFaces)]
    pub fn cull_front_faces(&self) -> bool {
        self.config.cull_front_faces
    }

    /// Set caster face culling.
    #[wasm_bindgen(setter, js_name = cullFrontFaces)]
    pub fn set_cull_front_faces(&mut self, cull: bool) {
        self.config.cull_front_faces = cull;
    }

    /// Cascade debug tinting.
    #[wasm_bindgen(getter)]
    pub fn debug(&self) -> bool {
        self.config.debug
    }

    /// Set cascade debug tinting.
    #[wasm_bindgen(setter)]
    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    /// Cascaded sampling.
    #[wasm_bindgen(getter)]
    pub fn cascade(&self) -> bool {
        self.config.cascade
    }

    /// Set cascaded sampling.
    #[wasm_bindgen(setter)]
    pub fn set_cascade(&mut self, cascade: bool) {
        self.config.cascade = cascade;
    }

    /// Defines the main pass shaders must be built with.
    #[wasm_bindgen(js_name = shaderDefines)]
    pub fn shader_defines(&self) -> Vec<String> {
        self.config
            .shader_defines()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

impl ShadowSettings {
    /// The wrapped configuration.
    pub fn config(&self) -> ShadowMapConfig {
        self.config
    }
}

impl From<ShadowMapConfig> for ShadowSettings {
    fn from(config: ShadowMapConfig) -> Self {
        Self { config }
    }
}

/// Log the crate version to the browser console.
#[wasm_bindgen(js_name = logVersion)]
pub fn log_version() {
    web_sys::console::log_1(&JsValue::from_str(&format!(
        "{} {}",
        crate::NAME,
        crate::VERSION
    )));
}
