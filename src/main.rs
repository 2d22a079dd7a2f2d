// ./src/main.rs
use bevy::prelude::*;
use bevy_egui::EguiPlugin;

pub mod debug;
pub mod globe;
pub mod math;
pub mod setup;

use debug::{
    ui::{GuessInput, game_panel_ui_system},
    visualization::outline::{DebugOverlay, draw_country_outlines_system},
};
use globe::{GlobeConfig, GlobePlugin, config::DEFAULT_CONFIG_PATH};
use setup::setup_scene;

/// Woher die aktive Konfiguration stammt, für die Startmeldung.
#[derive(Resource, Debug, Clone)]
enum ConfigSource {
    File(String),
    Defaults(String),
}

fn load_config() -> (GlobeConfig, ConfigSource) {
    match GlobeConfig::load(DEFAULT_CONFIG_PATH) {
        Ok(config) => (config, ConfigSource::File(DEFAULT_CONFIG_PATH.to_string())),
        Err(err) => (GlobeConfig::default(), ConfigSource::Defaults(err.to_string())),
    }
}

fn log_config_source_system(source: Res<ConfigSource>) {
    match source.as_ref() {
        ConfigSource::File(path) => info!("Globe config loaded from {path}"),
        ConfigSource::Defaults(reason) => info!("Using default globe config ({reason})"),
    }
}

fn main() {
    let (config, source) = load_config();
    let overlay = DebugOverlay::from_config(&config);

    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(EguiPlugin)
        .insert_resource(config)
        .insert_resource(source)
        .insert_resource(overlay)
        .init_resource::<GuessInput>()
        .add_plugins(GlobePlugin)
        .add_systems(Startup, (log_config_source_system, setup_scene))
        .add_systems(Update, (game_panel_ui_system, draw_country_outlines_system))
        .run();
}
