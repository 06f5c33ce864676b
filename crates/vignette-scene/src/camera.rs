//! Camera, lighting and per-frame transform updates

use bevy::prelude::*;
use vignette_core::{Angles, CameraPose};

use crate::interaction::tick_controller;
use crate::types::{KeyLight, MainCamera, ModelPivot, SceneInteraction, SceneSettings};

/// Plugin for the camera rig and lights
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera_and_lights)
            .add_systems(Update, apply_controller_transforms.after(tick_controller));
    }
}

fn setup_camera_and_lights(
    mut commands: Commands,
    settings: Res<SceneSettings>,
    interaction: Res<SceneInteraction>,
) {
    let camera = &settings.camera;
    let lighting = &settings.lighting;

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_degrees.to_radians(),
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        camera_transform(&interaction.camera_pose()),
        // Soft white fill so unlit sides are not black
        AmbientLight {
            color: Color::WHITE,
            brightness: lighting.ambient_brightness,
            ..default()
        },
        MainCamera,
    ));

    // Key light, kept at a fixed offset from the camera
    commands.spawn((
        DirectionalLight {
            illuminance: lighting.key_illuminance,
            shadows_enabled: lighting.shadows,
            ..default()
        },
        light_transform(interaction.light_position()),
        KeyLight,
    ));

    for position in &lighting.fill_positions {
        commands.spawn((
            DirectionalLight {
                illuminance: lighting.fill_illuminance,
                shadows_enabled: false,
                ..default()
            },
            light_transform(*position),
        ));
    }
}

/// Copy the controller's camera pose, light position and model rotation into the scene
fn apply_controller_transforms(
    interaction: Res<SceneInteraction>,
    mut cameras: Query<&mut Transform, (With<MainCamera>, Without<KeyLight>, Without<ModelPivot>)>,
    mut lights: Query<&mut Transform, (With<KeyLight>, Without<MainCamera>, Without<ModelPivot>)>,
    mut pivots: Query<&mut Transform, (With<ModelPivot>, Without<MainCamera>, Without<KeyLight>)>,
) {
    if let Ok(mut transform) = cameras.single_mut() {
        *transform = camera_transform(&interaction.camera_pose());
    }

    if let Ok(mut transform) = lights.single_mut() {
        *transform = light_transform(interaction.light_position());
    }

    for mut transform in pivots.iter_mut() {
        transform.rotation = model_rotation(interaction.model_rotation());
    }
}

fn camera_transform(pose: &CameraPose) -> Transform {
    Transform::from_translation(Vec3::from_array(pose.position))
        .looking_at(Vec3::from_array(pose.look_at), Vec3::Y)
}

/// Directional lights shine from their position toward the origin
fn light_transform(position: [f32; 3]) -> Transform {
    Transform::from_translation(Vec3::from_array(position)).looking_at(Vec3::ZERO, Vec3::Y)
}

/// Pitch about X then yaw about Y
pub fn model_rotation(angles: Angles) -> Quat {
    Quat::from_euler(EulerRot::XYZ, angles.pitch, angles.yaw, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_looks_at_target() {
        let pose = CameraPose {
            position: [0.0, 0.5, 2.0],
            look_at: [0.0, 0.1, 0.0],
        };
        let t = camera_transform(&pose);
        let expected = (Vec3::new(0.0, 0.1, 0.0) - Vec3::new(0.0, 0.5, 2.0)).normalize();
        assert!(t.forward().as_vec3().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_model_rotation_matches_angles() {
        let q = model_rotation(Angles { pitch: 0.3, yaw: -1.2 });
        let (x, y, z) = q.to_euler(EulerRot::XYZ);
        assert!((x - 0.3).abs() < 1e-5);
        assert!((y + 1.2).abs() < 1e-5);
        assert!(z.abs() < 1e-5);
    }
}
