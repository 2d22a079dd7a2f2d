// src/globe/feature.rs

use super::error::{DatasetError, FeatureError};
use crate::math::types::*;
use geo::coord;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Sprachkürzel, für die Ländernamen aus `NAME_<KÜRZEL>` gelesen werden.
pub const NAME_LANGUAGES: [&str; 25] = [
    "en", "fr", "es", "ar", "bn", "de", "el", "hi", "he", "hu", "id", "it", "ja", "ko", "nl", "pl",
    "pt", "ru", "sv", "tr", "uk", "ur", "vi", "zh", "zht",
];

/// Natural-Earth-Platzhalter für fehlende ISO-Codes.
const MISSING_CODE: &str = "-99";

/// GeoJSON-FeatureCollection. Koordinaten bleiben zunächst rohes JSON und
/// werden pro Feature geprüft, damit ein fehlerhaftes Land nicht die ganze
/// Datei unbrauchbar macht.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text).map_err(|source| DatasetError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Value,
}

impl Feature {
    fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// ISO-3166-1-Alpha-2-Code in Großbuchstaben. `ISO_A2_EH` springt ein,
    /// wenn `ISO_A2` fehlt, leer ist oder den Platzhalter `-99` trägt.
    pub fn country_code(&self) -> Option<String> {
        ["ISO_A2", "ISO_A2_EH"]
            .into_iter()
            .filter_map(|key| self.property(key))
            .find(|code| *code != MISSING_CODE)
            .map(str::to_uppercase)
    }

    /// Ländernamen pro Sprache. Fehlt `NAME_<KÜRZEL>`, wird `NAME` und danach
    /// `NAME_EN` verwendet. Sprachen ganz ohne Namen fehlen in der Map.
    pub fn localized_names(&self) -> BTreeMap<&'static str, String> {
        let fallback = self.property("NAME").or_else(|| self.property("NAME_EN"));

        NAME_LANGUAGES
            .iter()
            .filter_map(|&language| {
                let key = format!("NAME_{}", language.to_uppercase());
                self.property(&key)
                    .or(fallback)
                    .map(|name| (language, name.to_string()))
            })
            .collect()
    }

    /// Name für Logausgaben.
    pub fn label(&self) -> &str {
        self.property("NAME")
            .or_else(|| self.property("NAME_EN"))
            .or_else(|| self.property("ISO_A2"))
            .unwrap_or("<unnamed>")
    }

    /// Alle Polygone des Features, jeweils als Liste von Ringen (Außenring zuerst).
    ///
    /// `Polygon` ergibt ein Polygon, `MultiPolygon` beliebig viele. Ringe
    /// werden nur strukturell geprüft; zu kurze Ringe sortiert der Katalog aus.
    pub fn polygons(&self) -> Result<Vec<Vec<Ring>>, FeatureError> {
        let geometry = self.geometry.as_ref().ok_or(FeatureError::MissingGeometry)?;

        match geometry.kind.as_str() {
            "Polygon" => Ok(vec![parse_polygon(&geometry.coordinates)?]),
            "MultiPolygon" => as_array(&geometry.coordinates, "multipolygon")?
                .iter()
                .map(parse_polygon)
                .collect(),
            other => Err(FeatureError::UnsupportedGeometry {
                kind: other.to_string(),
            }),
        }
    }
}

fn as_array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>, FeatureError> {
    value
        .as_array()
        .ok_or_else(|| FeatureError::MalformedCoordinates {
            reason: format!("{what} is not an array"),
        })
}

fn parse_polygon(value: &Value) -> Result<Vec<Ring>, FeatureError> {
    as_array(value, "polygon")?.iter().map(parse_ring).collect()
}

fn parse_ring(value: &Value) -> Result<Ring, FeatureError> {
    let coords = as_array(value, "ring")?
        .iter()
        .map(parse_position)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Ring::new(coords))
}

fn parse_position(value: &Value) -> Result<GeoPoint, FeatureError> {
    let position = as_array(value, "position")?;
    match position.as_slice() {
        [lon, lat, ..] => match (lon.as_f64(), lat.as_f64()) {
            (Some(lon), Some(lat)) => Ok(coord! { x: lon, y: lat }),
            _ => Err(FeatureError::MalformedCoordinates {
                reason: format!("position {value} is not numeric"),
            }),
        },
        _ => Err(FeatureError::MalformedCoordinates {
            reason: format!("position {value} has fewer than two values"),
        }),
    }
}
