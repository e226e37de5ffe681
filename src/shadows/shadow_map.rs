//! Shadow map pre-render pass.

use crate::camera::Camera;
use crate::core::{
    Capability, CullFaceMode, FrontFaceDirection, Plugin, PluginType, RenderResult, Renderer,
};
use crate::helpers::CameraHelper;
use crate::light::{Light, LightKind};
use crate::material::DepthMaterials;
use crate::math::{Frustum, Mat4, Vec2, Vec3, SHADOW_BIAS_MATRIX};
use crate::scene::{NodeId, Object3D, ObjectKind, Scene};
use crate::texture::{
    PixelFormat, RenderTarget, RenderTargetOptions, RenderTargetTexture, TextureFilter,
};

use super::{create_virtual_light, fit_shadow_camera, update_virtual_light, FitScratch};
use super::ShadowMapConfig;

/// Renders one depth map per shadow-casting light before the main pass.
///
/// Shadow resources (render target, shadow camera, debug helper) are created
/// on a light the first time it is seen and reused afterwards. Cascaded
/// directional lights are expanded into one virtual light per cascade, each
/// rendered as an independent light.
pub struct ShadowMapPlugin {
    config: ShadowMapConfig,
    depth: DepthMaterials,
    frustum: Frustum,
    scratch: FitScratch,
}

impl Default for ShadowMapPlugin {
    fn default() -> Self {
        Self::new(ShadowMapConfig::default())
    }
}

impl ShadowMapPlugin {
    /// Create the plugin with the given configuration.
    pub fn new(config: ShadowMapConfig) -> Self {
        Self {
            config,
            depth: DepthMaterials::new(),
            frustum: Frustum::default(),
            scratch: FitScratch::default(),
        }
    }

    /// Current configuration.
    #[inline]
    pub fn config(&self) -> &ShadowMapConfig {
        &self.config
    }

    /// Mutable configuration.
    #[inline]
    pub fn config_mut(&mut self) -> &mut ShadowMapConfig {
        &mut self.config
    }

    /// Turn the pass on or off.
    #[inline]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    /// Depth materials casters are drawn with.
    #[inline]
    pub fn depth_materials(&self) -> &DepthMaterials {
        &self.depth
    }

    /// Culling frustum of the last light rendered.
    #[inline]
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    fn setup_state(&self, renderer: &mut dyn Renderer) {
        let gl = renderer.gl();
        gl.clear_color(1.0, 1.0, 1.0, 1.0);
        gl.disable(Capability::Blend);
        gl.enable(Capability::CullFace);
        gl.front_face(FrontFaceDirection::Ccw);
        gl.cull_face(if self.config.cull_front_faces {
            CullFaceMode::Front
        } else {
            CullFaceMode::Back
        });
        renderer.set_depth_test(true);
    }

    fn restore_state(&self, renderer: &mut dyn Renderer) {
        let color = renderer.clear_color();
        let alpha = renderer.clear_alpha();
        let gl = renderer.gl();
        gl.clear_color(color.r, color.g, color.b, alpha);
        gl.enable(Capability::Blend);
        if self.config.cull_front_faces {
            gl.cull_face(CullFaceMode::Back);
        }
    }

    fn render_lights(
        &mut self,
        renderer: &mut dyn Renderer,
        scene: &mut Scene,
        camera: NodeId,
    ) -> RenderResult<()> {
        let lights = expand_lights(scene, camera);
        log::trace!("Rendering {} shadow maps", lights.len());

        for light in lights {
            self.render_light(renderer, scene, camera, light)?;
        }
        Ok(())
    }

    fn render_light(
        &mut self,
        renderer: &mut dyn Renderer,
        scene: &mut Scene,
        camera: NodeId,
        light: NodeId,
    ) -> RenderResult<()> {
        let Some(shadow_camera) = ensure_resources(renderer, scene, light) else {
            return Ok(());
        };

        let is_controlling = scene
            .light(light)
            .and_then(Light::as_virtual)
            .is_some_and(|v| v.original_camera == Some(camera));
        if is_controlling {
            fit_shadow_camera(scene, camera, light, &mut self.scratch);
        }

        // aim the shadow camera from the light at its target
        let light_position = scene.world_position(light);
        let target_position = scene
            .light(light)
            .and_then(|l| l.target)
            .map_or(Vec3::ZERO, |t| scene.world_position(t));
        scene[shadow_camera].set_position(light_position);
        scene.look_at(shadow_camera, target_position);
        scene.update_node_matrix_world(shadow_camera);

        let Some(cam) = scene.camera_mut(shadow_camera) else {
            return Ok(());
        };
        cam.flatten_matrices();
        let view = *cam.matrix_world_inverse();
        let view_projection = *cam.projection_matrix() * view;
        let projection_inverse = *cam.projection_matrix_inverse();
        self.frustum = Frustum::from_matrix(&view_projection);

        let (camera_visible, helper) = match scene.light_mut(light) {
            Some(l) => {
                l.shadow.matrix = Some(SHADOW_BIAS_MATRIX * view_projection);
                (l.shadow.camera_visible, l.shadow.camera_helper)
            }
            None => return Ok(()),
        };
        if let Some(helper) = helper {
            let node = &mut scene[helper];
            node.set_visible(camera_visible);
            if let (true, ObjectKind::CameraHelper(lines)) = (camera_visible, &mut node.kind) {
                lines.update_from_projection_inverse(&projection_inverse);
            }
        }

        if let Some(map) = scene.light_mut(light).and_then(|l| l.shadow.map.as_mut()) {
            renderer.set_render_target(Some(map as &mut dyn RenderTargetTexture))?;
        }
        renderer.clear();

        self.cull(scene, view);
        self.draw(renderer, scene, shadow_camera)
    }

    /// Mark the render list entries that cast into the current shadow map.
    fn cull(&self, scene: &mut Scene, view: Mat4) {
        for i in 0..scene.render_list().len() {
            let object = scene.render_list()[i].object;
            let node = &scene[object];

            let include = node.visibility.is_shadow_caster()
                && match &node.kind {
                    ObjectKind::Mesh(mesh) if node.visibility.frustum_culled => mesh
                        .world_bounding_sphere(node.matrix_world())
                        .map_or(true, |sphere| self.frustum.intersects_sphere(&sphere)),
                    _ => true,
                };
            let model_view = view * *node.matrix_world();

            scene.render_list_mut()[i].render = include;
            if include {
                scene[object].model_view_matrix = model_view;
            }
        }
    }

    fn draw(
        &self,
        renderer: &mut dyn Renderer,
        scene: &Scene,
        shadow_camera: NodeId,
    ) -> RenderResult<()> {
        for entry in scene.render_list().iter().filter(|e| e.render) {
            let Some(mesh) = scene.mesh(entry.object) else {
                continue;
            };
            let material = self.depth.select(
                mesh.custom_depth_material.as_ref(),
                mesh.is_skinned(),
                mesh.has_morph_targets(),
            );

            if entry.buffer.is_direct() {
                renderer.render_buffer_direct(
                    scene,
                    shadow_camera,
                    material,
                    &entry.buffer,
                    entry.object,
                )?;
            } else {
                renderer.render_buffer(scene, shadow_camera, material, &entry.buffer, entry.object)?;
            }
        }
        Ok(())
    }
}

impl Plugin for ShadowMapPlugin {
    fn plugin_type(&self) -> PluginType {
        PluginType::PreRender
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn render(
        &mut self,
        renderer: &mut dyn Renderer,
        scene: &mut Scene,
        camera: NodeId,
        _width: u32,
        _height: u32,
    ) -> RenderResult<()> {
        if !self.config.is_active() {
            return Ok(());
        }

        self.setup_state(renderer);
        let result = self.render_lights(renderer, scene, camera);
        self.restore_state(renderer);
        result
    }
}

/// Flatten the scene's lights into the list of lights that get a shadow pass:
/// shadow casters in order, with cascaded directional lights replaced by their
/// per-cascade virtual lights. The scene's own light list is left untouched.
fn expand_lights(scene: &mut Scene, camera: NodeId) -> Vec<NodeId> {
    let mut passes = Vec::new();

    for light in scene.lights().to_vec() {
        let Some(source) = scene.light(light) else {
            continue;
        };
        if !source.cast_shadow {
            continue;
        }
        let cascades = match source.as_directional() {
            Some(directional) if directional.cascade.enabled => directional.cascade.count,
            _ => {
                passes.push(light);
                continue;
            }
        };

        for index in 0..cascades {
            let existing = scene
                .light(light)
                .and_then(Light::as_directional)
                .and_then(|d| d.cascade.virtual_light(index));
            let node = match existing {
                Some(node) => node,
                None => create_virtual_light(scene, light, camera, index),
            };
            update_virtual_light(scene, light, index);
            if let Some(pivot) = scene[node].parent() {
                scene.update_node_matrix_world(pivot);
            }
            passes.push(node);
        }
    }
    passes
}

/// Create the light's shadow map and shadow camera if missing. Returns the
/// shadow camera, or `None` if the light kind cannot cast a shadow map.
fn ensure_resources(
    renderer: &mut dyn Renderer,
    scene: &mut Scene,
    light: NodeId,
) -> Option<NodeId> {
    let source = scene.light_mut(light)?;
    let shadow = &mut source.shadow;

    if shadow.map.is_none() {
        let options = RenderTargetOptions::new(shadow.map_width, shadow.map_height)
            .with_filters(TextureFilter::Linear, TextureFilter::Linear)
            .with_format(PixelFormat::Rgba);
        shadow.map = Some(RenderTarget::new(options));
        shadow.map_size = Some(Vec2::new(shadow.map_width as f32, shadow.map_height as f32));
        shadow.matrix = Some(Mat4::IDENTITY);
    }

    let existing = shadow.camera;
    let shadow_camera = match existing {
        Some(existing) => existing,
        None => {
            let camera = match &source.kind {
                LightKind::Spot(_) => Camera::perspective(
                    shadow.camera_fov,
                    shadow.aspect(),
                    shadow.camera_near,
                    shadow.camera_far,
                ),
                LightKind::Directional(_) | LightKind::Virtual(_) => Camera::orthographic(
                    shadow.camera_left,
                    shadow.camera_right,
                    shadow.camera_top,
                    shadow.camera_bottom,
                    shadow.camera_near,
                    shadow.camera_far,
                ),
                other => {
                    log::error!("Unsupported light type for shadow: {}", other.type_name());
                    return None;
                }
            };

            let node = scene.add(Object3D::camera(camera).with_name("ShadowCamera"));
            if let Some(source) = scene.light_mut(light) {
                source.shadow.camera = Some(node);
            }
            if renderer.is_auto_update_scene() {
                scene.update_matrix_world();
            }
            log::debug!("Created shadow camera for light {:?}", light);
            node
        }
    };

    let source = scene.light(light)?;
    if source.shadow.camera_visible && source.shadow.camera_helper.is_none() {
        let helper = scene
            .camera(shadow_camera)
            .map(CameraHelper::new)
            .unwrap_or_default();
        let node = scene.add_child(
            shadow_camera,
            Object3D::new(ObjectKind::CameraHelper(helper)).with_name("ShadowCameraHelper"),
        );
        if let Some(source) = scene.light_mut(light) {
            source.shadow.camera_helper = Some(node);
        }
    }

    Some(shadow_camera)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::testing::{DrawEntry, RecordingRenderer};
    use crate::core::GraphicsContext;
    use crate::geometry::{Geometry, GeometryGroup};
    use crate::light::DirectionalLight;
    use crate::material::{Material, Shader};
    use crate::math::Color;
    use crate::objects::{Mesh, Skeleton};

    struct Fixture {
        scene: Scene,
        camera: NodeId,
        light: NodeId,
        caster: NodeId,
    }

    fn caster(position: Vec3) -> Object3D {
        let mesh = Mesh::new(Arc::new(Geometry::cube(2.0)), Arc::new(Material::basic()));
        Object3D::mesh(mesh)
            .with_position(position)
            .with_cast_shadow(true)
    }

    fn fixture(light: Light) -> Fixture {
        let mut scene = Scene::new();
        let camera = scene.add(
            Object3D::camera(Camera::perspective(50.0, 1.0, 1.0, 200.0))
                .with_position(Vec3::new(0.0, 5.0, 20.0)),
        );
        let light = scene.add(Object3D::light(light).with_position(Vec3::new(0.0, 100.0, 0.0)));
        let caster = scene.add(caster(Vec3::ZERO));
        scene.update_matrix_world();
        scene.refresh_render_list();
        Fixture { scene, camera, light, caster }
    }

    fn directional() -> Light {
        let mut light = Light::directional(Color::WHITE, 1.0).with_shadows();
        light.shadow = light
            .shadow
            .with_camera_box(-50.0, 50.0, 50.0, -50.0)
            .with_camera_range(1.0, 500.0);
        light
    }

    fn run(plugin: &mut ShadowMapPlugin, renderer: &mut RecordingRenderer, f: &mut Fixture) {
        plugin
            .render(renderer, &mut f.scene, f.camera, 800, 600)
            .unwrap();
    }

    #[test]
    fn test_directional_light_gets_resources() {
        let mut f = fixture(directional());
        let mut plugin = ShadowMapPlugin::default();
        let mut renderer = RecordingRenderer::default();
        run(&mut plugin, &mut renderer, &mut f);

        let shadow = &f.scene.light(f.light).unwrap().shadow;
        assert!(shadow.map.as_ref().is_some_and(|m| m.is_allocated()));
        assert!(shadow.camera.is_some());
        assert!(shadow.matrix.is_some_and(|m| m != Mat4::IDENTITY));
        assert_eq!(shadow.map_size, Some(Vec2::new(512.0, 512.0)));

        assert!(f.scene.render_list()[0].render);
        assert_eq!(renderer.draws.len(), 1);
        assert_eq!(renderer.draws[0].object, f.caster);
        assert_eq!(renderer.draws[0].camera, shadow.camera.unwrap());
        assert_eq!(renderer.draws[0].material_name, "DepthRGBA");
        assert_eq!(renderer.draws[0].entry, DrawEntry::Direct);
        assert_eq!(renderer.draws[0].target, shadow.map.as_ref().map(|m| m.id()));
    }

    #[test]
    fn test_non_caster_light_gets_nothing() {
        let mut light = directional();
        light.cast_shadow = false;
        let mut f = fixture(light);
        let nodes_before = f.scene.len();
        let mut renderer = RecordingRenderer::default();
        run(&mut ShadowMapPlugin::default(), &mut renderer, &mut f);

        let shadow = &f.scene.light(f.light).unwrap().shadow;
        assert!(shadow.map.is_none());
        assert!(shadow.camera.is_none());
        assert!(shadow.matrix.is_none());
        assert_eq!(f.scene.len(), nodes_before);
        assert!(renderer.draws.is_empty());
        assert!(renderer.gl.textures.is_empty());
    }

    #[test]
    fn test_resources_reused_across_frames() {
        let mut f = fixture(directional());
        let mut plugin = ShadowMapPlugin::default();
        let mut renderer = RecordingRenderer::default();

        run(&mut plugin, &mut renderer, &mut f);
        let first = {
            let shadow = &f.scene.light(f.light).unwrap().shadow;
            let map = shadow.map.as_ref().unwrap();
            (map.id(), map.texture(), map.framebuffer(), shadow.camera)
        };
        let nodes = f.scene.len();

        run(&mut plugin, &mut renderer, &mut f);
        let shadow = &f.scene.light(f.light).unwrap().shadow;
        let map = shadow.map.as_ref().unwrap();
        assert_eq!((map.id(), map.texture(), map.framebuffer(), shadow.camera), first);
        assert_eq!(f.scene.len(), nodes);
        assert_eq!(renderer.gl.textures.len(), 1);
        assert_eq!(renderer.gl.framebuffers.len(), 1);
    }

    #[test]
    fn test_gate_skips_everything() {
        for config in [
            ShadowMapConfig::new().enabled(false),
            ShadowMapConfig::new().auto_update(false),
        ] {
            let mut f = fixture(directional());
            let mut renderer = RecordingRenderer::default();
            run(&mut ShadowMapPlugin::new(config), &mut renderer, &mut f);

            assert!(f.scene.light(f.light).unwrap().shadow.map.is_none());
            assert_eq!(renderer.gl.state, Default::default());
            assert!(!renderer.depth_test);
        }
    }

    #[test]
    fn test_state_restored_for_any_light_count() {
        for count in [0usize, 1, 3] {
            let mut scene = Scene::new();
            let camera = scene.add(Object3D::camera(Camera::perspective(50.0, 1.0, 1.0, 100.0)));
            for i in 0..count {
                scene.add(
                    Object3D::light(directional())
                        .with_position(Vec3::new(i as f32 * 10.0, 50.0, 0.0)),
                );
            }
            scene.add(caster(Vec3::ZERO));
            scene.update_matrix_world();
            scene.refresh_render_list();

            let mut renderer = RecordingRenderer::default();
            let mut plugin = ShadowMapPlugin::default();
            plugin.render(&mut renderer, &mut scene, camera, 1, 1).unwrap();

            let state = renderer.gl.raster_state();
            assert!(state.blend);
            assert_eq!(state.clear_color, [0.2, 0.3, 0.4, 0.5]);
            assert_eq!(state.cull_face_mode, CullFaceMode::Back);
            assert!(state.cull_face);
            assert!(renderer.depth_test);
            assert_eq!(renderer.clears, count);
        }
    }

    #[test]
    fn test_back_face_culling_mode() {
        let mut f = fixture(directional());
        let mut renderer = RecordingRenderer::default();
        renderer.gl.cull_face(CullFaceMode::FrontAndBack);
        let mut plugin = ShadowMapPlugin::new(ShadowMapConfig::new().cull_front_faces(false));
        run(&mut plugin, &mut renderer, &mut f);

        // caster pass culled back faces and nothing was restored over it
        assert_eq!(renderer.gl.state.cull_face_mode, CullFaceMode::Back);
        assert_eq!(renderer.draws.len(), 1);
    }

    #[test]
    fn test_culling_respects_frustum_flag() {
        let mut f = fixture(directional());
        let outside = f.scene.add(caster(Vec3::new(400.0, 0.0, 0.0)));
        let mut uncullable = caster(Vec3::new(-400.0, 0.0, 0.0));
        uncullable.visibility.frustum_culled = false;
        let uncullable = f.scene.add(uncullable);
        let hidden = f.scene.add(caster(Vec3::ZERO));
        f.scene[hidden].set_visible(false);
        let no_cast = f.scene.add(caster(Vec3::ZERO).with_cast_shadow(false));
        f.scene.update_matrix_world();
        f.scene.refresh_render_list();

        let mut renderer = RecordingRenderer::default();
        run(&mut ShadowMapPlugin::default(), &mut renderer, &mut f);

        let drawn: Vec<NodeId> = renderer.draws.iter().map(|d| d.object).collect();
        assert!(drawn.contains(&f.caster));
        assert!(drawn.contains(&uncullable));
        assert!(!drawn.contains(&outside));
        assert!(!drawn.contains(&hidden));
        assert!(!drawn.contains(&no_cast));

        let entry = |id: NodeId| f.scene.render_list().iter().find(|e| e.object == id).unwrap();
        assert!(!entry(outside).render);
        assert!(entry(uncullable).render);
    }

    #[test]
    fn test_model_view_relative_to_shadow_camera() {
        let mut f = fixture(directional());
        run(&mut ShadowMapPlugin::default(), &mut RecordingRenderer::default(), &mut f);

        let shadow_camera = f.scene.light(f.light).unwrap().shadow.camera.unwrap();
        let view = *f.scene.camera(shadow_camera).unwrap().matrix_world_inverse();
        let expected = view * *f.scene[f.caster].matrix_world();
        assert!(f.scene[f.caster].model_view_matrix.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_shadow_camera_looks_from_light_to_target() {
        let mut f = fixture(directional());
        run(&mut ShadowMapPlugin::default(), &mut RecordingRenderer::default(), &mut f);

        let shadow = &f.scene.light(f.light).unwrap().shadow;
        let cam = shadow.camera.unwrap();
        assert!(f.scene.world_position(cam).abs_diff_eq(Vec3::new(0.0, 100.0, 0.0), 1e-4));

        // origin lands in the middle of the shadow map
        let uv = shadow.matrix.unwrap().project_point3(Vec3::ZERO);
        assert!((uv.x - 0.5).abs() < 1e-4 && (uv.y - 0.5).abs() < 1e-4);
        assert!(uv.z > 0.0 && uv.z < 1.0);

        let flat = f.scene.camera(cam).unwrap().view_matrix_array();
        assert_eq!(*flat, f.scene.camera(cam).unwrap().matrix_world_inverse().to_cols_array());
    }

    #[test]
    fn test_spot_light_uses_perspective_camera() {
        let mut light = Light::spot(Color::WHITE, 1.0).with_shadows();
        light.shadow = light.shadow.with_map_size(1024, 512);
        let mut f = fixture(light);
        run(&mut ShadowMapPlugin::default(), &mut RecordingRenderer::default(), &mut f);

        let cam = f.scene.light(f.light).unwrap().shadow.camera.unwrap();
        let camera = f.scene.camera(cam).unwrap();
        assert!(camera.is_perspective());
        match camera.projection {
            crate::camera::Projection::Perspective { fov, aspect, near, far } => {
                assert_eq!(fov, 50.0);
                assert_eq!(aspect, 2.0);
                assert_eq!((near, far), (50.0, 5000.0));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_point_light_is_skipped() {
        let point = Light::point(Color::WHITE, 1.0, 0.0).with_shadows();
        let mut f = fixture(point);
        let spot = f.scene.add(
            Object3D::light(Light::spot(Color::WHITE, 1.0).with_shadows())
                .with_position(Vec3::new(0.0, 50.0, 0.0)),
        );
        f.scene.update_matrix_world();

        let mut renderer = RecordingRenderer::default();
        run(&mut ShadowMapPlugin::default(), &mut renderer, &mut f);

        assert!(f.scene.light(f.light).unwrap().shadow.camera.is_none());
        assert!(f.scene.light(spot).unwrap().shadow.camera.is_some());
        assert_eq!(renderer.clears, 1);
    }

    #[test]
    fn test_camera_helper_follows_flag() {
        let mut light = directional();
        light.shadow.camera_visible = true;
        let mut f = fixture(light);
        let mut plugin = ShadowMapPlugin::default();
        run(&mut plugin, &mut RecordingRenderer::default(), &mut f);

        let shadow = &f.scene.light(f.light).unwrap().shadow;
        let helper = shadow.camera_helper.unwrap();
        assert_eq!(f.scene[helper].parent(), shadow.camera);
        assert!(f.scene[helper].is_visible());

        f.scene.light_mut(f.light).unwrap().shadow.camera_visible = false;
        run(&mut plugin, &mut RecordingRenderer::default(), &mut f);
        assert!(!f.scene[helper].is_visible());
    }

    #[test]
    fn test_scene_refresh_follows_renderer_flag() {
        for auto_update in [true, false] {
            let mut f = fixture(directional());
            f.scene[f.caster].set_position(Vec3::new(3.0, 0.0, 0.0));

            let mut renderer = RecordingRenderer {
                auto_update_scene: auto_update,
                ..Default::default()
            };
            run(&mut ShadowMapPlugin::default(), &mut renderer, &mut f);

            let moved = f.scene[f.caster].world_position() == Vec3::new(3.0, 0.0, 0.0);
            assert_eq!(moved, auto_update);
        }
    }

    #[test]
    fn test_depth_material_selection() {
        let mut f = fixture(directional());
        let morph = Geometry::cube(1.0).with_morph_targets(vec![vec![[0.0; 3]; 8]]);
        let morphed = f.scene.add(
            Object3D::mesh(Mesh::new(Arc::new(morph), Arc::new(Material::basic())))
                .with_cast_shadow(true),
        );
        let skinned = f.scene.add(
            Object3D::mesh(Mesh::skinned(
                Arc::new(Geometry::cube(1.0)),
                Arc::new(Material::basic()),
                Skeleton::new(2),
            ))
            .with_cast_shadow(true),
        );
        let custom = Arc::new(Material::shader(Shader::depth()));
        let custom_mesh = Mesh::new(Arc::new(Geometry::cube(1.0)), Arc::new(Material::basic()))
            .with_custom_depth_material(custom.clone());
        let customised = f.scene.add(Object3D::mesh(custom_mesh).with_cast_shadow(true));
        f.scene.update_matrix_world();
        f.scene.refresh_render_list();

        let mut renderer = RecordingRenderer::default();
        let mut plugin = ShadowMapPlugin::default();
        run(&mut plugin, &mut renderer, &mut f);

        let material_id_of = |id| {
            renderer
                .draws
                .iter()
                .find(|d| d.object == id)
                .map(|d| d.material)
                .unwrap()
        };
        let depth = plugin.depth_materials();
        assert_eq!(material_id_of(f.caster), depth.base.id());
        assert_eq!(material_id_of(morphed), depth.morph.id());
        assert_eq!(material_id_of(skinned), depth.skin.id());
        assert_eq!(material_id_of(customised), custom.id());

        let material_of = |id| {
            renderer
                .draws
                .iter()
                .find(|d| d.object == id)
                .map(|d| d.material_name.clone())
                .unwrap()
        };
        assert_eq!(material_of(f.caster), "DepthRGBA");
        assert_eq!(material_of(morphed), "DepthRGBAMorph");
        assert_eq!(material_of(skinned), "DepthRGBASkin");
        assert_eq!(material_of(customised), custom.name);
    }

    #[test]
    fn test_grouped_geometry_uses_group_entry_point() {
        let mut f = fixture(directional());
        let geometry = Geometry::cube(1.0).with_groups(
            vec![
                GeometryGroup { start: 0, count: 18, material_index: Some(0) },
                GeometryGroup { start: 18, count: 18, material_index: Some(1) },
            ],
            vec![Arc::new(Material::basic()), Arc::new(Material::basic())],
        );
        let grouped = f.scene.add(
            Object3D::mesh(Mesh::new(Arc::new(geometry), Arc::new(Material::face())))
                .with_cast_shadow(true),
        );
        f.scene.update_matrix_world();
        f.scene.refresh_render_list();

        let mut renderer = RecordingRenderer::default();
        run(&mut ShadowMapPlugin::default(), &mut renderer, &mut f);

        let grouped_draws: Vec<_> = renderer.draws.iter().filter(|d| d.object == grouped).collect();
        assert_eq!(grouped_draws.len(), 2);
        assert!(grouped_draws.iter().all(|d| d.entry == DrawEntry::Grouped));
    }

    #[test]
    fn test_cascades_expand_into_virtual_lights() {
        let mut light = Light::new(
            Color::WHITE,
            1.0,
            LightKind::Directional(DirectionalLight::cascaded(3)),
        )
        .with_shadows();
        light.shadow = light.shadow.with_camera_range(1.0, 2000.0);
        let mut f = fixture(light);
        let mut plugin = ShadowMapPlugin::default();
        let mut renderer = RecordingRenderer::default();
        run(&mut plugin, &mut renderer, &mut f);

        let virtuals: Vec<NodeId> = f
            .scene
            .light(f.light)
            .unwrap()
            .as_directional()
            .unwrap()
            .cascade
            .virtual_lights()
            .collect();
        assert_eq!(virtuals.len(), 3);
        assert_eq!(renderer.clears, 3);
        // the scene keeps the original light, the parent gets no map of its own
        assert_eq!(f.scene.lights(), &[f.light]);
        assert!(f.scene.light(f.light).unwrap().shadow.map.is_none());

        for node in &virtuals {
            let v = f.scene.light(*node).unwrap();
            assert!(v.shadow.map.is_some());
            assert!(v.shadow.matrix.is_some());
            let corners = v.as_virtual().unwrap();
            assert!(corners.points_world.iter().any(|p| *p != Vec3::ZERO));
        }

        let nodes = f.scene.len();
        run(&mut plugin, &mut renderer, &mut f);
        assert_eq!(f.scene.len(), nodes);
        assert_eq!(renderer.clears, 6);
    }

    #[test]
    fn test_cascade_fit_only_for_original_camera() {
        let light = Light::new(
            Color::WHITE,
            1.0,
            LightKind::Directional(DirectionalLight::cascaded(1)),
        )
        .with_shadows();
        let mut f = fixture(light);
        let mut plugin = ShadowMapPlugin::default();
        run(&mut plugin, &mut RecordingRenderer::default(), &mut f);

        let node = f
            .scene
            .light(f.light)
            .unwrap()
            .as_directional()
            .unwrap()
            .cascade
            .virtual_light(0)
            .unwrap();
        let cam = f.scene.light(node).unwrap().shadow.camera.unwrap();
        let fitted = f.scene.camera(cam).unwrap().projection;

        let other = f.scene.add(Object3D::camera(Camera::perspective(90.0, 1.0, 0.1, 10.0)));
        f.scene.update_matrix_world();
        plugin
            .render(&mut RecordingRenderer::default(), &mut f.scene, other, 1, 1)
            .unwrap();
        assert_eq!(f.scene.camera(cam).unwrap().projection, fitted);
    }
}
