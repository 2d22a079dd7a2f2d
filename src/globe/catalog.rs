// src/globe/catalog.rs

use super::{
    error::{CatalogError, CatalogResult, FeatureError},
    feature::Feature,
    mesh::{SurfaceMesher, TriangleMesh, fill_holes, is_large_country},
};
use crate::math::{
    geometry::sphere::{
        antimeridian::{crosses_antimeridian, split_at_antimeridian},
        projection::SphereProjector,
    },
    types::*,
};
use bevy::log::{info, warn};
use bevy::render::color::Color;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::{BTreeMap, BTreeSet, HashMap};

const TARGET_COLOR: u32 = 0x00FF00;
const WRONG_GUESS_COLOR: u32 = 0xFF0000;
const CORRECT_GUESS_COLOR: u32 = 0x4CAF50;
const NEUTRAL_OPACITY: f32 = 0.3;

/// Hervorhebungszustand eines Landes im Spiel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisualState {
    #[default]
    Neutral,
    Target,
    WrongGuess,
    CorrectGuess,
}

/// Farbe (24 Bit RGB) und Deckkraft, mit der ein Land gezeichnet wird.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub rgb: u32,
    pub opacity: f32,
}

impl Appearance {
    pub fn color(&self) -> Color {
        let [_, r, g, b] = self.rgb.to_be_bytes();
        Color::rgba_u8(r, g, b, (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

/// Radien, auf denen Flächen und Umrisse erzeugt werden.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshSettings {
    pub surface_radius: f32,
    pub outline_radius: f32,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            surface_radius: 2.05,
            outline_radius: 2.06,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryRecord {
    pub code: String,
    pub names: BTreeMap<&'static str, String>,
    pub meshes: Vec<TriangleMesh>,
    /// Geschlossene Umrisslinien aller Eingaberinge
    pub outlines: Vec<Vec<Vec3>>,
    pub original_color: u32,
    pub visual_state: VisualState,
}

impl CountryRecord {
    pub fn appearance(&self) -> Appearance {
        match self.visual_state {
            VisualState::Neutral => Appearance {
                rgb: self.original_color,
                opacity: NEUTRAL_OPACITY,
            },
            VisualState::Target => Appearance {
                rgb: TARGET_COLOR,
                opacity: 1.0,
            },
            VisualState::WrongGuess => Appearance {
                rgb: WRONG_GUESS_COLOR,
                opacity: 1.0,
            },
            VisualState::CorrectGuess => Appearance {
                rgb: CORRECT_GUESS_COLOR,
                opacity: 1.0,
            },
        }
    }

    /// Englischer Name, sonst der Code.
    pub fn display_name(&self) -> &str {
        self.names.get("en").map_or(self.code.as_str(), String::as_str)
    }

    /// Alle Namen des Landes, jede Schreibweise nur einmal.
    pub fn unique_names(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.names
            .values()
            .map(String::as_str)
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Normalisierter Mittelwert aller Vertices aller Teilnetze.
    pub fn center(&self) -> Option<Vec3> {
        let (sum, count) = self
            .meshes
            .iter()
            .flat_map(|mesh| mesh.vertices.iter())
            .fold((Vec3::ZERO, 0usize), |(sum, count), v| (sum + *v, count + 1));
        if count == 0 {
            return None;
        }
        (sum / count as f32).try_normalize()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(TriangleMesh::triangle_count).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFeature {
    /// Position in der FeatureCollection
    pub index: usize,
    pub label: String,
    pub reason: FeatureError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub name: String,
    pub previous_code: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedFeature>,
}

/// Alle Länder mit ihren Netzen, Namen und Darstellungszuständen.
#[derive(Debug, Clone, Default)]
pub struct CountryCatalog {
    countries: BTreeMap<String, CountryRecord>,
    /// Kleingeschriebener Name → Code
    name_index: HashMap<String, String>,
    name_collisions: Vec<NameCollision>,
    report: BuildReport,
}

impl CountryCatalog {
    /// Baut den Katalog aus den Features einer FeatureCollection.
    ///
    /// Fehlerhafte Features werden mit einer Warnung übersprungen und im
    /// [`BuildReport`] vermerkt. Die Grundfarben sind für denselben `seed` und
    /// dieselbe Eingabe reproduzierbar.
    pub fn build(features: &[Feature], settings: &MeshSettings, seed: u64) -> Self {
        let mesher = SurfaceMesher::new(settings.surface_radius);
        let outline_projector = SphereProjector::new(settings.outline_radius);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut catalog = Self::default();

        for (index, feature) in features.iter().enumerate() {
            let record = match build_record(feature, &mesher, &outline_projector) {
                Ok(record) => record,
                Err(reason) => {
                    catalog.skip(index, feature, reason);
                    continue;
                }
            };
            if catalog.countries.contains_key(&record.code) {
                let code = record.code.clone();
                catalog.skip(index, feature, FeatureError::DuplicateCode { code });
                continue;
            }

            let record = CountryRecord {
                original_color: rng.random_range(0..=0x00FF_FFFF),
                ..record
            };
            catalog.register_names(&record);
            catalog.countries.insert(record.code.clone(), record);
            catalog.report.loaded += 1;
        }

        info!(
            "Country catalog built: {} countries, {} features skipped, {} name collisions",
            catalog.report.loaded,
            catalog.report.skipped.len(),
            catalog.name_collisions.len()
        );
        catalog
    }

    fn skip(&mut self, index: usize, feature: &Feature, reason: FeatureError) {
        warn!("Skipping feature #{index} ({}): {reason}", feature.label());
        self.report.skipped.push(SkippedFeature {
            index,
            label: feature.label().to_string(),
            reason,
        });
    }

    fn register_names(&mut self, record: &CountryRecord) {
        for name in record.unique_names() {
            let key = name.to_lowercase();
            if let Some(previous_code) = self.name_index.insert(key, record.code.clone()) {
                if previous_code != record.code {
                    warn!(
                        "Name '{name}' of {} shadows the same name of {previous_code}",
                        record.code
                    );
                    self.name_collisions.push(NameCollision {
                        name: name.to_string(),
                        previous_code,
                        code: record.code.clone(),
                    });
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Alle Länder, nach Code sortiert.
    pub fn iter(&self) -> impl Iterator<Item = &CountryRecord> {
        self.countries.values()
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn name_collisions(&self) -> &[NameCollision] {
        &self.name_collisions
    }

    pub fn get_by_code(&self, code: &str) -> Option<&CountryRecord> {
        self.countries.get(&code.trim().to_uppercase())
    }

    /// Sucht ein Land über einen seiner Namen, ohne Beachtung der Groß-/Kleinschreibung.
    pub fn get_by_name(&self, name: &str) -> Option<&CountryRecord> {
        self.name_index
            .get(&name.trim().to_lowercase())
            .and_then(|code| self.countries.get(code))
    }

    pub fn random_country(&self, rng: &mut impl Rng) -> CatalogResult<&CountryRecord> {
        if self.countries.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }
        let index = rng.random_range(0..self.countries.len());
        self.countries
            .values()
            .nth(index)
            .ok_or(CatalogError::EmptyCatalog)
    }

    /// Alle Namen aller Länder, sortiert. Gleiche Namen verschiedener Länder
    /// bleiben erhalten.
    pub fn all_display_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .countries
            .values()
            .flat_map(CountryRecord::unique_names)
            .collect();
        names.sort_unstable();
        names
    }

    pub fn set_visual_state(&mut self, code: &str, state: VisualState) -> CatalogResult<()> {
        let key = code.trim().to_uppercase();
        let record = self
            .countries
            .get_mut(&key)
            .ok_or(CatalogError::UnknownCode { code: key })?;
        record.visual_state = state;
        Ok(())
    }

    pub fn reset_visual_states(&mut self) {
        for record in self.countries.values_mut() {
            record.visual_state = VisualState::Neutral;
        }
    }
}

/// Liest Code und Namen und vernetzt alle Ringe eines Features.
fn build_record(
    feature: &Feature,
    mesher: &SurfaceMesher,
    outline_projector: &SphereProjector,
) -> Result<CountryRecord, FeatureError> {
    let code = feature
        .country_code()
        .ok_or(FeatureError::MissingCountryCode)?;
    let polygons = feature.polygons()?;

    let mut meshes = Vec::new();
    let mut outlines = Vec::new();
    for ring in polygons.iter().flatten() {
        if ring.0.len() < 3 {
            warn!("{code}: ignoring ring with {} points", ring.0.len());
            continue;
        }

        let mut outline = outline_projector.project_ring(ring);
        if outline.first() != outline.last() {
            outline.push(outline[0]);
        }
        outlines.push(outline);

        let parts = if crosses_antimeridian(ring) {
            split_at_antimeridian(ring).into_parts()
        } else {
            vec![ring.clone()]
        };
        let large = is_large_country(ring);

        for part in parts {
            let mesh = mesher.triangulate(&part);
            if mesh.is_empty() {
                warn!("{code}: ring part with {} points produced no triangles", part.0.len());
                continue;
            }
            meshes.push(if large { fill_holes(&mesh) } else { mesh });
        }
    }

    if meshes.is_empty() {
        return Err(FeatureError::NoUsableRings);
    }

    Ok(CountryRecord {
        code,
        names: feature.localized_names(),
        meshes,
        outlines,
        original_color: 0,
        visual_state: VisualState::Neutral,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::globe::feature::FeatureCollection;
    use crate::math::geometry::sphere::projection::unproject;
    use serde_json::{Value, json};

    pub(crate) fn square(lon: f64, lat: f64, size: f64) -> Value {
        json!([[
            [lon, lat],
            [lon + size, lat],
            [lon + size, lat + size],
            [lon, lat + size],
            [lon, lat]
        ]])
    }

    pub(crate) fn country(code: &str, names: Value, coordinates: Value) -> Value {
        let mut properties = names;
        properties["ISO_A2"] = json!(code);
        json!({
            "type": "Feature",
            "properties": properties,
            "geometry": { "type": "Polygon", "coordinates": coordinates }
        })
    }

    pub(crate) fn features(values: Vec<Value>) -> Vec<Feature> {
        serde_json::from_value::<FeatureCollection>(json!({ "features": values }))
            .unwrap()
            .features
    }

    /// Drei Länder in Äquatornähe, eines davon an der Datumsgrenze.
    pub(crate) fn sample_catalog() -> CountryCatalog {
        let fiji = json!([[
            [177.0, -16.0],
            [-179.0, -16.0],
            [-179.0, -19.0],
            [177.0, -19.0],
            [177.0, -16.0]
        ]]);
        CountryCatalog::build(
            &features(vec![
                country("TL", json!({ "NAME_EN": "Testland" }), square(10.0, 5.0, 8.0)),
                country(
                    "OL",
                    json!({ "NAME": "Otherland", "NAME_FR": "Autreland" }),
                    square(-40.0, -10.0, 10.0),
                ),
                country("FJ", json!({ "NAME": "Fiji" }), fiji),
            ]),
            &MeshSettings::default(),
            42,
        )
    }

    #[test]
    fn test_single_country() {
        let catalog = CountryCatalog::build(
            &features(vec![country(
                "AA",
                json!({ "NAME_EN": "Testland" }),
                square(0.0, 0.0, 10.0),
            )]),
            &MeshSettings::default(),
            1,
        );

        assert_eq!(catalog.len(), 1);
        let record = catalog.get_by_code("aa").unwrap();
        assert_eq!(record.code, "AA");
        assert_eq!(record.meshes.len(), 1);
        assert!(record.meshes[0].validate().is_ok());
        assert_eq!(record.outlines.len(), 1);
        assert_eq!(record.outlines[0].first(), record.outlines[0].last());
        assert_eq!(record.names.len(), 25);
        assert_eq!(catalog.all_display_names(), vec!["Testland"]);
        assert_eq!(catalog.get_by_name("tEsTlAnD").map(|r| r.code.as_str()), Some("AA"));
    }

    #[test]
    fn test_large_country_meshes_are_filled_once() {
        let outline = [
            (20.0, 50.0),
            (50.0, 50.0),
            (80.0, 50.0),
            (110.0, 50.0),
            (150.0, 50.0),
            (150.0, 70.0),
            (110.0, 70.0),
            (80.0, 70.0),
            (50.0, 70.0),
            (20.0, 70.0),
            (20.0, 50.0),
        ];
        assert!(is_large_country(&Ring::from(outline.to_vec())));

        let coordinates: Vec<[f64; 2]> = outline.iter().map(|&(lon, lat)| [lon, lat]).collect();
        let catalog = CountryCatalog::build(
            &features(vec![country(
                "WL",
                json!({ "NAME": "Wideland" }),
                json!([coordinates]),
            )]),
            &MeshSettings::default(),
            7,
        );

        let record = catalog.get_by_code("WL").unwrap();
        assert_eq!(record.meshes.len(), 1);
        for mesh in &record.meshes {
            assert!(!mesh.is_empty());
            assert!(mesh.validate().is_ok());
            assert_eq!(fill_holes(mesh), *mesh);
            for triangle in &mesh.indices {
                let [a, b, c] = triangle.map(|i| mesh.vertices[i as usize]);
                assert!(mesh.face_normal(*triangle).dot(a + b + c) > 0.0);
            }
        }
    }

    #[test]
    fn test_outlines_lie_on_outline_radius() {
        let catalog = sample_catalog();
        let settings = MeshSettings::default();
        for record in catalog.iter() {
            for point in record.outlines.iter().flatten() {
                assert!((point.length() - settings.outline_radius).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_antimeridian_country_is_split() {
        let catalog = sample_catalog();
        let fiji = catalog.get_by_code("FJ").unwrap();
        assert_eq!(fiji.meshes.len(), 2);
        assert!(fiji.meshes.iter().all(|mesh| mesh.validate().is_ok()));
        assert_eq!(fiji.outlines.len(), 1);

        let center = unproject(fiji.center().unwrap());
        assert!(center.x.abs() > 170.0);
    }

    #[test]
    fn test_invalid_features_are_skipped() {
        let catalog = CountryCatalog::build(
            &features(vec![
                json!({ "properties": { "NAME": "Nocode" }, "geometry": { "type": "Polygon", "coordinates": square(0.0, 0.0, 1.0) } }),
                json!({ "properties": { "ISO_A2": "BR" }, "geometry": { "type": "Polygon", "coordinates": [[ "broken" ]] } }),
                json!({ "properties": { "ISO_A2": "SH" }, "geometry": { "type": "Polygon", "coordinates": [[[1.0, 1.0], [2.0, 2.0]]] } }),
                country("OK", json!({ "NAME": "Okland" }), square(0.0, 0.0, 1.0)),
            ]),
            &MeshSettings::default(),
            0,
        );

        assert_eq!(catalog.len(), 1);
        let report = catalog.report();
        assert_eq!(report.loaded, 1);
        let reasons: Vec<_> = report.skipped.iter().map(|s| (s.index, s.reason.clone())).collect();
        assert_eq!(reasons[0], (0, FeatureError::MissingCountryCode));
        assert!(matches!(reasons[1], (1, FeatureError::MalformedCoordinates { .. })));
        assert_eq!(reasons[2], (2, FeatureError::NoUsableRings));
    }

    #[test]
    fn test_duplicate_code_first_wins() {
        let catalog = CountryCatalog::build(
            &features(vec![
                country("DU", json!({ "NAME": "First" }), square(0.0, 0.0, 1.0)),
                country("DU", json!({ "NAME": "Second" }), square(5.0, 5.0, 1.0)),
            ]),
            &MeshSettings::default(),
            0,
        );
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get_by_code("DU").unwrap().display_name(), "First");
        assert!(catalog.get_by_name("Second").is_none());
        assert_eq!(
            catalog.report().skipped[0].reason,
            FeatureError::DuplicateCode {
                code: "DU".to_string()
            }
        );
    }

    #[test]
    fn test_name_collision_last_write_wins() {
        let catalog = CountryCatalog::build(
            &features(vec![
                country("AA", json!({ "NAME": "Congo" }), square(0.0, 0.0, 1.0)),
                country("BB", json!({ "NAME": "Congo" }), square(5.0, 5.0, 1.0)),
            ]),
            &MeshSettings::default(),
            0,
        );
        assert_eq!(catalog.get_by_name("congo").unwrap().code, "BB");
        assert_eq!(
            catalog.name_collisions(),
            &[NameCollision {
                name: "Congo".to_string(),
                previous_code: "AA".to_string(),
                code: "BB".to_string(),
            }]
        );
        assert_eq!(catalog.all_display_names(), vec!["Congo", "Congo"]);
    }

    #[test]
    fn test_display_names_are_sorted() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.all_display_names(),
            vec!["Autreland", "Fiji", "Otherland", "Testland"]
        );
    }

    #[test]
    fn test_colors_are_reproducible() {
        let a = sample_catalog();
        let b = sample_catalog();
        for (left, right) in a.iter().zip(b.iter()) {
            assert_eq!(left.original_color, right.original_color);
            assert!(left.original_color <= 0xFF_FFFF);
        }
    }

    #[test]
    fn test_random_country() {
        let catalog = sample_catalog();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            let record = catalog.random_country(&mut rng).unwrap();
            assert!(catalog.get_by_code(&record.code).is_some());
        }

        let empty = CountryCatalog::default();
        assert_eq!(
            empty.random_country(&mut rng).map(|r| r.code.clone()),
            Err(CatalogError::EmptyCatalog)
        );
    }

    #[test]
    fn test_visual_states() {
        let mut catalog = sample_catalog();
        let neutral = catalog.get_by_code("TL").unwrap().appearance();
        assert_eq!(neutral.opacity, NEUTRAL_OPACITY);

        catalog.set_visual_state("TL", VisualState::Target).unwrap();
        catalog.set_visual_state("OL", VisualState::WrongGuess).unwrap();
        catalog.set_visual_state("FJ", VisualState::CorrectGuess).unwrap();
        assert_eq!(
            catalog.get_by_code("TL").unwrap().appearance(),
            Appearance { rgb: 0x00FF00, opacity: 1.0 }
        );
        assert_eq!(catalog.get_by_code("OL").unwrap().appearance().rgb, 0xFF0000);
        assert_eq!(catalog.get_by_code("FJ").unwrap().appearance().rgb, 0x4CAF50);

        assert_eq!(
            catalog.set_visual_state("XX", VisualState::Target),
            Err(CatalogError::UnknownCode {
                code: "XX".to_string()
            })
        );

        catalog.reset_visual_states();
        assert!(catalog.iter().all(|r| r.visual_state == VisualState::Neutral));
        assert_eq!(catalog.get_by_code("TL").unwrap().appearance(), neutral);
    }

    #[test]
    fn test_appearance_color() {
        let appearance = Appearance {
            rgb: 0xFF0000,
            opacity: 1.0,
        };
        assert_eq!(appearance.color(), Color::rgba_u8(255, 0, 0, 255));
    }
}
