//! Virtual lights standing in for the cascades of a directional light.
//!
//! Each cascade gets one virtual light, created the first time the cascade is
//! seen and resynchronised with its parent every frame. The virtual light and
//! its target hang off a gyroscope pivot attached to the main camera, so a
//! cascade follows the viewer's position without inheriting its rotation.

use crate::light::{Light, LightKind, VirtualLight};
use crate::math::Vec3;
use crate::scene::{NodeId, Object3D, Scene};

/// Create the virtual light for cascade `index` of the directional light at
/// `light`, parented under a new gyroscope on `camera`.
///
/// # Panics
///
/// Panics if `light` is not a directional light or its cascade arrays are
/// shorter than `index + 1`.
pub fn create_virtual_light(
    scene: &mut Scene,
    light: NodeId,
    camera: NodeId,
    index: usize,
) -> NodeId {
    let (mut virtual_light, offset) = {
        let parent = &scene[light];
        let Some(source) = scene.light(light) else {
            panic!("{} is not a light", parent.name());
        };
        let Some(directional) = source.as_directional() else {
            panic!("{} cannot be cascaded", source.kind.type_name());
        };
        let cascade = &directional.cascade;

        let mut virtual_light = Light::virtual_light(source.color);
        virtual_light.only_shadow = true;
        virtual_light.cast_shadow = true;

        let shadow = &mut virtual_light.shadow;
        shadow.camera_near = source.shadow.camera_near;
        shadow.camera_far = source.shadow.camera_far;
        shadow.camera_left = source.shadow.camera_left;
        shadow.camera_right = source.shadow.camera_right;
        shadow.camera_top = source.shadow.camera_top;
        shadow.camera_bottom = source.shadow.camera_bottom;
        shadow.camera_visible = source.shadow.camera_visible;
        shadow.darkness = source.shadow.darkness;
        shadow.bias = cascade.bias[index];
        shadow.map_width = cascade.width[index];
        shadow.map_height = cascade.height[index];

        let mut corners = VirtualLight::new(cascade.near_z[index], cascade.far_z[index]);
        corners.original_camera = Some(camera);
        virtual_light.kind = LightKind::Virtual(corners);

        (virtual_light, cascade.offset)
    };

    let gyro = scene.add_child(
        camera,
        Object3D::gyroscope()
            .with_name(format!("CascadePivot{index}"))
            .with_position(offset),
    );
    let target = scene.add_child(
        gyro,
        Object3D::group().with_name(format!("CascadeTarget{index}")),
    );
    virtual_light.target = Some(target);
    let node = scene.add_child(
        gyro,
        Object3D::light(virtual_light).with_name(format!("VirtualLight{index}")),
    );

    if let Some(directional) = scene.light_mut(light).and_then(Light::as_directional_mut) {
        directional.cascade.set_virtual_light(index, node);
    }

    log::debug!("Created virtual light for cascade {}", index);
    node
}

/// Copy the parent light's current state onto the virtual light of cascade
/// `index` and aim it at its target.
pub fn update_virtual_light(scene: &mut Scene, light: NodeId, index: usize) {
    let Some(source) = scene.light(light) else {
        return;
    };
    let Some(directional) = source.as_directional() else {
        return;
    };
    let Some(node) = directional.cascade.virtual_light(index) else {
        return;
    };
    let cascade = &directional.cascade;
    let (near_z, far_z, bias) = (cascade.near_z[index], cascade.far_z[index], cascade.bias[index]);
    let camera_visible = source.shadow.camera_visible;
    let darkness = source.shadow.darkness;
    let source_target = source.target;
    let position = scene[light].position();
    let target_position = source_target.map_or(Vec3::ZERO, |t| scene[t].position());

    let Some(virtual_light) = scene.light_mut(node) else {
        return;
    };
    virtual_light.shadow.camera_visible = camera_visible;
    virtual_light.shadow.darkness = darkness;
    virtual_light.shadow.bias = bias;
    let target = virtual_light.target;
    if let Some(corners) = virtual_light.as_virtual_mut() {
        corners.set_depth_range(near_z, far_z);
    }

    scene[node].set_position(position);
    let aim = match target {
        Some(target) => {
            scene[target].set_position(target_position);
            target_position
        }
        None => Vec3::ZERO,
    };
    scene.look_at(node, aim);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::light::DirectionalLight;
    use crate::math::Color;

    fn cascaded_scene() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let camera = scene.add(Object3D::camera(Camera::perspective(45.0, 1.0, 1.0, 100.0)));

        let mut light = Light::new(
            Color::new(1.0, 0.5, 0.25),
            1.0,
            LightKind::Directional(DirectionalLight::cascaded(3)),
        )
        .with_shadows();
        light.shadow.darkness = 0.7;
        if let Some(d) = light.as_directional_mut() {
            d.cascade.bias = vec![0.1, 0.2, 0.3];
            d.cascade.width = vec![1024, 512, 256];
        }
        let light = scene.add(Object3D::light(light).with_position(Vec3::new(10.0, 20.0, 5.0)));
        (scene, light, camera)
    }

    #[test]
    fn test_create_copies_parent_settings() {
        let (mut scene, light, camera) = cascaded_scene();
        let node = create_virtual_light(&mut scene, light, camera, 1);

        let v = scene.light(node).unwrap();
        assert!(v.only_shadow && v.cast_shadow);
        assert_eq!(v.color, Color::new(1.0, 0.5, 0.25));
        assert_eq!(v.shadow.bias, 0.2);
        assert_eq!(v.shadow.map_width, 512);
        assert_eq!(v.shadow.darkness, 0.7);
        assert_eq!(v.as_virtual().unwrap().original_camera, Some(camera));
        assert_eq!(v.as_virtual().unwrap().points_frustum[0].z, 0.99);
        assert_eq!(v.as_virtual().unwrap().points_frustum[4].z, 0.998);

        let d = scene.light(light).unwrap().as_directional().unwrap();
        assert_eq!(d.cascade.virtual_light(1), Some(node));
        assert_eq!(d.cascade.virtual_light(0), None);
    }

    #[test]
    fn test_virtual_light_rides_on_camera_pivot() {
        let (mut scene, light, camera) = cascaded_scene();
        let node = create_virtual_light(&mut scene, light, camera, 0);

        let gyro = scene[node].parent().unwrap();
        assert_eq!(scene[gyro].parent(), Some(camera));
        assert_eq!(scene[gyro].position(), Vec3::new(0.0, 0.0, -1000.0));
        let target = scene.light(node).unwrap().target.unwrap();
        assert_eq!(scene[target].parent(), Some(gyro));

        // never registered as a scene light
        assert_eq!(scene.lights(), &[light]);
    }

    #[test]
    fn test_update_follows_parent() {
        let (mut scene, light, camera) = cascaded_scene();
        let node = create_virtual_light(&mut scene, light, camera, 2);

        scene[light].set_position(Vec3::new(-3.0, 8.0, 1.0));
        {
            let parent = scene.light_mut(light).unwrap();
            parent.shadow.darkness = 0.2;
            parent.shadow.camera_visible = true;
            let cascade = &mut parent.as_directional_mut().unwrap().cascade;
            cascade.bias[2] = 0.05;
            cascade.near_z[2] = 0.5;
            cascade.far_z[2] = 0.75;
        }
        update_virtual_light(&mut scene, light, 2);

        assert_eq!(scene[node].position(), Vec3::new(-3.0, 8.0, 1.0));
        let v = scene.light(node).unwrap();
        assert_eq!(v.shadow.darkness, 0.2);
        assert!(v.shadow.camera_visible);
        assert_eq!(v.shadow.bias, 0.05);

        let corners = &v.as_virtual().unwrap().points_frustum;
        assert!(corners[..4].iter().all(|p| p.z == 0.5));
        assert!(corners[4..].iter().all(|p| p.z == 0.75));
        assert!(corners.iter().all(|p| p.x.abs() == 1.0 && p.y.abs() == 1.0));
    }

    #[test]
    fn test_update_copies_target_position() {
        let (mut scene, light, camera) = cascaded_scene();
        let aim = scene.add(Object3D::group().with_position(Vec3::new(4.0, 0.0, -2.0)));
        scene.light_mut(light).unwrap().target = Some(aim);

        let node = create_virtual_light(&mut scene, light, camera, 0);
        update_virtual_light(&mut scene, light, 0);

        let target = scene.light(node).unwrap().target.unwrap();
        assert_eq!(scene[target].position(), Vec3::new(4.0, 0.0, -2.0));
    }

    #[test]
    fn test_update_without_virtual_light_is_noop() {
        let (mut scene, light, _) = cascaded_scene();
        let before = scene.len();
        update_virtual_light(&mut scene, light, 0);
        assert_eq!(scene.len(), before);
    }
}
