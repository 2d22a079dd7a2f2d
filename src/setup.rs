// ./src/setup.rs
use crate::globe::{GlobeCamera, GlobeConfig};
use bevy::prelude::*;

pub fn setup_scene(
    mut commands: Commands,
    config: Res<GlobeConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Erdkugel unter den Länderflächen
    commands.spawn(PbrBundle {
        mesh: meshes.add(Sphere::new(config.earth_radius).mesh().uv(64, 32)),
        material: materials.add(StandardMaterial {
            base_color: Color::rgb(0.05, 0.2, 0.45),
            metallic: 0.1,
            perceptual_roughness: 0.8,
            ..default()
        }),
        ..default()
    });

    // Licht
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
    });
    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            illuminance: 8_000.0,
            ..default()
        },
        transform: Transform::from_xyz(4.0, 6.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });

    // Kamera auf der +Z-Achse, der Abstand folgt dem Zoom des Controllers
    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_xyz(0.0, 0.0, config.orientation.initial_zoom)
                .looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        },
        GlobeCamera,
    ));
}
