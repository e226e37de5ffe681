//! Orthographic shadow camera fitting for cascade slices.

use crate::math::Vec3;
use crate::scene::{NodeId, Scene};

/// Running bounds reused across fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitScratch {
    /// Smallest corner seen so far, in shadow camera space.
    pub min: Vec3,
    /// Largest corner seen so far, in shadow camera space.
    pub max: Vec3,
}

impl Default for FitScratch {
    fn default() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }
}

impl FitScratch {
    /// Forget previous bounds.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Grow the bounds to contain `point`.
    #[inline]
    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }
}

/// Shrink the orthographic shadow camera of the virtual light at `light` so it
/// exactly bounds the slice of `camera`'s frustum the light covers.
///
/// Corners are unprojected through the main camera, stored back on the light
/// as world points, then boxed in the shadow camera's view space. Only the XY
/// extent is applied; near and far stay as configured.
///
/// Does nothing unless `light` is a virtual light with a shadow camera.
pub fn fit_shadow_camera(
    scene: &mut Scene,
    camera: NodeId,
    light: NodeId,
    scratch: &mut FitScratch,
) {
    let Some(main) = scene.camera(camera) else {
        return;
    };
    let main_world = *scene[camera].matrix_world();
    let unproject = |p: Vec3| main.unproject(p, &main_world);

    let Some(source) = scene.light(light) else {
        return;
    };
    let (Some(virtual_light), Some(shadow_camera)) = (source.as_virtual(), source.shadow.camera)
    else {
        return;
    };
    let Some(shadow_view) = scene.camera(shadow_camera).map(|c| *c.matrix_world_inverse()) else {
        return;
    };

    let mut points_world = [Vec3::ZERO; 8];
    scratch.reset();
    for (world, corner) in points_world.iter_mut().zip(virtual_light.points_frustum.iter()) {
        *world = unproject(*corner);
        scratch.expand(shadow_view.transform_point3(*world));
    }

    if let Some(v) = scene.light_mut(light).and_then(|l| l.as_virtual_mut()) {
        v.points_world = points_world;
    }
    if let Some(shadow) = scene.camera_mut(shadow_camera) {
        shadow.set_ortho_bounds(scratch.min.x, scratch.max.x, scratch.max.y, scratch.min.y);
        shadow.update_projection_matrix();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, Projection};
    use crate::light::{Light, LightKind, VirtualLight};
    use crate::math::Color;
    use crate::scene::Object3D;

    fn setup(near_z: f32, far_z: f32) -> (Scene, NodeId, NodeId, NodeId) {
        let mut scene = Scene::new();
        let camera = scene.add(
            Object3D::camera(Camera::perspective(60.0, 1.5, 1.0, 100.0))
                .with_position(Vec3::new(0.0, 2.0, 10.0)),
        );
        let shadow_camera = scene.add(
            Object3D::camera(Camera::orthographic(-500.0, 500.0, 500.0, -500.0, 1.0, 1000.0))
                .with_position(Vec3::new(50.0, 100.0, 20.0)),
        );
        scene.look_at(shadow_camera, Vec3::ZERO);

        let mut light = Light::virtual_light(Color::WHITE);
        let mut corners = VirtualLight::new(near_z, far_z);
        corners.original_camera = Some(camera);
        light.kind = LightKind::Virtual(corners);
        light.shadow.camera = Some(shadow_camera);
        let light = scene.add(Object3D::light(light));

        scene.update_matrix_world();
        (scene, camera, shadow_camera, light)
    }

    #[test]
    fn test_fit_matches_corner_aabb() {
        let (mut scene, camera, shadow_camera, light) = setup(-1.0, 0.99);
        let mut scratch = FitScratch::default();
        fit_shadow_camera(&mut scene, camera, light, &mut scratch);

        let view = *scene.camera(shadow_camera).unwrap().matrix_world_inverse();
        let world = scene.light(light).unwrap().as_virtual().unwrap().points_world;
        let local: Vec<Vec3> = world.iter().map(|p| view.transform_point3(*p)).collect();
        let min = local.iter().fold(Vec3::splat(f32::INFINITY), |a, p| a.min(*p));
        let max = local.iter().fold(Vec3::splat(f32::NEG_INFINITY), |a, p| a.max(*p));

        match scene.camera(shadow_camera).unwrap().projection {
            Projection::Orthographic { left, right, top, bottom, near, far } => {
                assert!((left - min.x).abs() < 1e-3);
                assert!((right - max.x).abs() < 1e-3);
                assert!((top - max.y).abs() < 1e-3);
                assert!((bottom - min.y).abs() < 1e-3);
                assert_eq!((near, far), (1.0, 1000.0));
            }
            _ => panic!("shadow camera must stay orthographic"),
        }
    }

    #[test]
    fn test_world_points_lie_on_main_frustum() {
        let (mut scene, camera, _, light) = setup(-1.0, 1.0);
        fit_shadow_camera(&mut scene, camera, light, &mut FitScratch::default());

        let main = scene.camera(camera).unwrap();
        let view_projection = main.view_projection_matrix();
        let world = scene.light(light).unwrap().as_virtual().unwrap().points_world;
        let corners = scene.light(light).unwrap().as_virtual().unwrap().points_frustum;
        for (w, c) in world.iter().zip(corners.iter()) {
            let back = view_projection.project_point3(*w);
            assert!(back.abs_diff_eq(*c, 1e-3), "{back:?} vs {c:?}");
        }
    }

    #[test]
    fn test_narrower_slice_gives_smaller_box() {
        let width = |near_z: f32, far_z: f32| {
            let (mut scene, camera, shadow_camera, light) = setup(near_z, far_z);
            fit_shadow_camera(&mut scene, camera, light, &mut FitScratch::default());
            match scene.camera(shadow_camera).unwrap().projection {
                Projection::Orthographic { left, right, .. } => right - left,
                _ => unreachable!(),
            }
        };
        assert!(width(-1.0, 0.5) < width(-1.0, 0.99));
    }

    #[test]
    fn test_non_virtual_light_untouched() {
        let (mut scene, camera, shadow_camera, _) = setup(-1.0, 0.99);
        let mut spot = Light::spot(Color::WHITE, 1.0);
        spot.shadow.camera = Some(shadow_camera);
        let spot = scene.add(Object3D::light(spot));

        let before = scene.camera(shadow_camera).unwrap().projection;
        fit_shadow_camera(&mut scene, camera, spot, &mut FitScratch::default());
        assert_eq!(scene.camera(shadow_camera).unwrap().projection, before);
    }

    #[test]
    fn test_identity_shadow_camera_bounds_whole_frustum() {
        let mut scene = Scene::new();
        let camera = scene.add(Object3D::camera(Camera::perspective(90.0, 1.0, 1.0, 10.0)));
        let shadow_camera = scene.add(Object3D::camera(Camera::orthographic(
            -500.0, 500.0, 500.0, -500.0, 1.0, 1000.0,
        )));
        let mut light = Light::virtual_light(Color::WHITE);
        let mut corners = VirtualLight::new(-1.0, 1.0);
        corners.original_camera = Some(camera);
        light.kind = LightKind::Virtual(corners);
        light.shadow.camera = Some(shadow_camera);
        let light = scene.add(Object3D::light(light));
        scene.update_matrix_world();

        fit_shadow_camera(&mut scene, camera, light, &mut FitScratch::default());

        // 90 degree fov: the far plane at z = -10 spans +-10 on both axes
        match scene.camera(shadow_camera).unwrap().projection {
            Projection::Orthographic { left, right, top, bottom, .. } => {
                assert!((left + 10.0).abs() < 1e-2, "left {left}");
                assert!((right - 10.0).abs() < 1e-2, "right {right}");
                assert!((top - 10.0).abs() < 1e-2, "top {top}");
                assert!((bottom + 10.0).abs() < 1e-2, "bottom {bottom}");
            }
            _ => panic!("shadow camera must stay orthographic"),
        }
    }

    #[test]
    fn test_scratch_expand() {
        let mut scratch = FitScratch::default();
        scratch.expand(Vec3::new(1.0, -2.0, 3.0));
        scratch.expand(Vec3::new(-1.0, 4.0, 0.0));
        assert_eq!(scratch.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(scratch.max, Vec3::new(1.0, 4.0, 3.0));
        scratch.reset();
        assert_eq!(scratch, FitScratch::default());
    }
}
