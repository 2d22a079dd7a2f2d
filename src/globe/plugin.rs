// src/globe/plugin.rs

use super::{
    catalog::{CountryCatalog, MeshSettings, VisualState},
    config::{GlobeConfig, OrientationConfig},
    feature::FeatureCollection,
    game::GameFacade,
    orientation::{OrientationController, OrientationPhase},
    session::GlobeSession,
};
use crate::math::probability::{SeedPlugin, SeedResource};
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

/// Pixel, die einer Mausrad-Zeile entsprechen.
const PIXELS_PER_LINE: f32 = 100.0;

/// Wurzel-Entität des Globus; ihre Rotation ist die Orientierung des Controllers.
#[derive(Component, Debug, Default)]
pub struct GlobeRoot;

#[derive(Component, Debug, Default)]
pub struct GlobeCamera;

/// Ein gezeichnetes Teilnetz eines Landes. `state` ist der zuletzt auf das
/// Material übertragene Zustand.
#[derive(Component, Debug, Clone)]
pub struct CountryMesh {
    pub code: String,
    pub state: VisualState,
}

pub struct GlobePlugin;

impl Plugin for GlobePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GlobeConfig>()
            .init_resource::<GameFacade>()
            .add_plugins(SeedPlugin)
            .add_systems(Startup, setup_globe_system)
            .add_systems(
                Update,
                (
                    globe_input_system,
                    step_orientation_system,
                    apply_globe_transform_system,
                    sync_country_materials_system,
                )
                    .chain(),
            );
    }
}

fn country_material(color: Color) -> StandardMaterial {
    StandardMaterial {
        base_color: color,
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        double_sided: true,
        cull_mode: None,
        ..default()
    }
}

/// Lädt die Länder, baut Katalog und Controller und startet die erste Runde.
///
/// Fehlt die Datei oder ist sie kaputt, startet das Spiel mit leerem Katalog.
pub fn setup_globe_system(
    mut commands: Commands,
    config: Res<GlobeConfig>,
    mut seed: ResMut<SeedResource>,
    mut game: ResMut<GameFacade>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    time: Res<Time>,
) {
    let collection = FeatureCollection::load(&config.countries_path).unwrap_or_else(|err| {
        error!("{err}");
        FeatureCollection::default()
    });

    let settings = MeshSettings {
        surface_radius: config.country_radius,
        outline_radius: config.outline_radius,
    };
    let catalog = CountryCatalog::build(&collection.features, &settings, config.color_seed);
    let controller = OrientationController::new(config.orientation, config.earth_tilt());
    let mut session = GlobeSession::new(catalog, controller);

    if let Err(err) = game.start_round(&mut session, seed.rng_mut(), time.elapsed_seconds()) {
        warn!("No round started: {err}");
    }

    commands
        .spawn((
            SpatialBundle::from_transform(Transform::from_rotation(session.orientation())),
            GlobeRoot,
        ))
        .with_children(|parent| {
            for item in session.draw_items() {
                let state = session
                    .catalog()
                    .get_by_code(item.code)
                    .map_or(VisualState::Neutral, |record| record.visual_state);
                parent.spawn((
                    PbrBundle {
                        mesh: meshes.add(item.mesh.to_bevy_mesh()),
                        material: materials.add(country_material(item.appearance.color())),
                        ..default()
                    },
                    CountryMesh {
                        code: item.code.to_string(),
                        state,
                    },
                ));
            }
        });

    info!(
        "Globe ready: {} countries, {} triangles",
        session.catalog().len(),
        session
            .catalog()
            .iter()
            .map(|record| record.triangle_count())
            .sum::<usize>()
    );
    commands.insert_resource(session);
}

/// Mausrad-Ereignis in Kameraabstand. Hochscrollen zoomt hinein.
pub fn wheel_zoom_delta(unit: MouseScrollUnit, y: f32, config: &OrientationConfig) -> f32 {
    let lines = match unit {
        MouseScrollUnit::Line => y,
        MouseScrollUnit::Pixel => y / PIXELS_PER_LINE,
    };
    -lines * config.wheel_zoom_step
}

/// Drehung durch die Pfeiltasten, die in diesem Frame gedrückt wurden.
pub fn keyboard_rotation(keys: &ButtonInput<KeyCode>, step: f32) -> Vec2 {
    [
        (KeyCode::ArrowLeft, Vec2::new(-step, 0.0)),
        (KeyCode::ArrowRight, Vec2::new(step, 0.0)),
        (KeyCode::ArrowUp, Vec2::new(0.0, -step)),
        (KeyCode::ArrowDown, Vec2::new(0.0, step)),
    ]
    .into_iter()
    .filter(|(key, _)| keys.just_pressed(*key))
    .map(|(_, rotation)| rotation)
    .sum()
}

/// Kameraabstand durch +/- in diesem Frame.
pub fn keyboard_zoom(keys: &ButtonInput<KeyCode>, step: f32) -> f32 {
    let zoom_in = keys.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]);
    let zoom_out = keys.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]);
    match (zoom_in, zoom_out) {
        (true, false) => -step,
        (false, true) => step,
        _ => 0.0,
    }
}

/// Maus und Tastatur auf den Controller. Eingaben, die egui gehören, bleiben liegen.
pub fn globe_input_system(
    mut session: ResMut<GlobeSession>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    mut contexts: EguiContexts,
) {
    let ctx = contexts.ctx_mut();
    let pointer_busy = ctx.wants_pointer_input() || ctx.is_pointer_over_area();
    let keyboard_busy = ctx.wants_keyboard_input();

    let controller = session.controller_mut();
    let config = *controller.config();

    let mouse_delta: Vec2 = motion.read().map(|event| event.delta).sum();
    let zoom_delta: f32 = wheel
        .read()
        .map(|event| wheel_zoom_delta(event.unit, event.y, &config))
        .sum();

    if mouse_buttons.just_pressed(MouseButton::Left) && !pointer_busy {
        controller.begin_drag();
    }
    if controller.phase() == OrientationPhase::Dragging {
        if mouse_buttons.pressed(MouseButton::Left) {
            controller.drag(mouse_delta);
        } else {
            controller.end_drag();
        }
    }

    if !pointer_busy && zoom_delta != 0.0 {
        controller.zoom_by(zoom_delta);
    }

    if keyboard_busy {
        return;
    }
    let rotation = keyboard_rotation(&keys, config.keyboard_rotation_step);
    if rotation != Vec2::ZERO {
        controller.nudge(rotation);
    }
    let zoom = keyboard_zoom(&keys, config.keyboard_zoom_step);
    if zoom != 0.0 {
        controller.zoom_by(zoom);
    }
}

pub fn step_orientation_system(mut session: ResMut<GlobeSession>, time: Res<Time>) {
    session.controller_mut().step(time.elapsed_seconds());
}

pub fn apply_globe_transform_system(
    session: Res<GlobeSession>,
    mut roots: Query<&mut Transform, (With<GlobeRoot>, Without<GlobeCamera>)>,
    mut cameras: Query<&mut Transform, (With<GlobeCamera>, Without<GlobeRoot>)>,
) {
    for mut transform in roots.iter_mut() {
        transform.rotation = session.orientation();
    }
    for mut transform in cameras.iter_mut() {
        *transform =
            Transform::from_xyz(0.0, 0.0, session.camera_distance()).looking_at(Vec3::ZERO, Vec3::Y);
    }
}

/// Überträgt geänderte Hervorhebungen auf die Materialien der Ländernetze.
pub fn sync_country_materials_system(
    session: Res<GlobeSession>,
    mut countries: Query<(&mut CountryMesh, &Handle<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (mut country, handle) in countries.iter_mut() {
        let Some(record) = session.catalog().get_by_code(&country.code) else {
            continue;
        };
        if record.visual_state == country.state {
            continue;
        }
        if let Some(material) = materials.get_mut(handle) {
            material.base_color = record.appearance().color();
        }
        country.state = record.visual_state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wheel_zoom_delta() {
        let config = OrientationConfig::default();
        assert_relative_eq!(wheel_zoom_delta(MouseScrollUnit::Line, 1.0, &config), -0.1);
        assert_relative_eq!(wheel_zoom_delta(MouseScrollUnit::Line, -2.0, &config), 0.2);
        assert_relative_eq!(wheel_zoom_delta(MouseScrollUnit::Pixel, 50.0, &config), -0.05);
    }

    #[test]
    fn test_keyboard_rotation() {
        let mut keys = ButtonInput::<KeyCode>::default();
        assert_eq!(keyboard_rotation(&keys, 0.05), Vec2::ZERO);

        keys.press(KeyCode::ArrowLeft);
        keys.press(KeyCode::ArrowDown);
        assert!(keyboard_rotation(&keys, 0.05).abs_diff_eq(Vec2::new(-0.05, 0.05), 1e-6));

        keys.clear();
        assert_eq!(keyboard_rotation(&keys, 0.05), Vec2::ZERO);
    }

    #[test]
    fn test_keyboard_zoom() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::NumpadAdd);
        assert_relative_eq!(keyboard_zoom(&keys, 0.2), -0.2);

        keys.press(KeyCode::Minus);
        assert_relative_eq!(keyboard_zoom(&keys, 0.2), 0.0);
    }
}
