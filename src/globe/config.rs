// src/globe/config.rs

use super::error::ConfigError;
use crate::math::utils::angles::deg_to_rad;
use bevy::prelude::*;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "assets/globe_config.json";

/// Globale Einstellungen des Globus. Alle Felder sind optional in der JSON-Datei.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// Pfad zur GeoJSON-FeatureCollection mit den Ländern
    pub countries_path: String,
    pub earth_radius: f32,
    /// Länderflächen liegen knapp über der Erdkugel
    pub country_radius: f32,
    /// Umrisslinien liegen knapp über den Länderflächen
    pub outline_radius: f32,
    /// Seed für die zufälligen Grundfarben der Länder
    pub color_seed: u64,
    /// Neigung der Erdachse beim Start in Grad
    pub earth_tilt_deg: f32,
    pub show_outlines: bool,
    pub orientation: OrientationConfig,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            countries_path: "assets/countries.geojson".to_string(),
            earth_radius: 2.0,
            country_radius: 2.05,
            outline_radius: 2.06,
            color_seed: 0x5EED,
            earth_tilt_deg: 23.5,
            show_outlines: true,
            orientation: OrientationConfig::default(),
        }
    }
}

impl GlobeConfig {
    /// Lädt die Konfiguration aus einer JSON-Datei.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn earth_tilt(&self) -> f32 {
        deg_to_rad(self.earth_tilt_deg)
    }
}

/// Parameter der Globus-Steuerung. Winkel in Grad, Geschwindigkeiten in Radiant pro Tick.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// Maximale Neigung nach Nord/Süd
    pub max_polar_angle_deg: f32,
    /// Maximale elastische Überdehnung über die Neigungsgrenze hinaus
    pub max_overshoot_deg: f32,
    /// Anteil einer Ziehbewegung, der jenseits der Grenze noch wirkt
    pub elasticity: f32,
    pub spring_strength: f32,
    pub spring_damping: f32,
    pub spring_epsilon: f32,
    /// Dämpfung der Trägheit pro Tick
    pub rotation_damping: f32,
    pub inertia_epsilon: f32,
    /// Radiant pro Pixel Mausbewegung
    pub drag_sensitivity: f32,
    /// Radiant pro Druck einer Pfeiltaste
    pub keyboard_rotation_step: f32,
    /// Kameraabstand pro Druck von +/-
    pub keyboard_zoom_step: f32,
    /// Kameraabstand pro Mausrad-Zeile
    pub wheel_zoom_step: f32,
    /// Dauer einer Animationsstufe in Sekunden
    pub stage_duration: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub initial_zoom: f32,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            max_polar_angle_deg: 30.0,
            max_overshoot_deg: 15.0,
            elasticity: 0.5,
            spring_strength: 0.2,
            spring_damping: 0.8,
            spring_epsilon: 0.001,
            rotation_damping: 0.95,
            inertia_epsilon: 0.001,
            drag_sensitivity: 0.0025,
            keyboard_rotation_step: 0.05,
            keyboard_zoom_step: 0.2,
            wheel_zoom_step: 0.1,
            stage_duration: 1.0,
            min_zoom: 3.0,
            max_zoom: 9.0,
            initial_zoom: 5.0,
        }
    }
}

impl OrientationConfig {
    pub fn max_polar_angle(&self) -> f32 {
        deg_to_rad(self.max_polar_angle_deg)
    }

    pub fn max_overshoot(&self) -> f32 {
        deg_to_rad(self.max_overshoot_deg)
    }
}
