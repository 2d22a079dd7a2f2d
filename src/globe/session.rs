// src/globe/session.rs

use super::{
    catalog::{Appearance, CountryCatalog, VisualState},
    error::{CatalogError, CatalogResult, OrientationError, SessionResult},
    mesh::TriangleMesh,
    orientation::OrientationController,
};
use crate::math::types::*;
use bevy::prelude::*;

/// Ein zu zeichnendes Teilnetz mit seiner aktuellen Darstellung.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub code: &'a str,
    pub mesh: &'a TriangleMesh,
    pub appearance: Appearance,
}

/// Verbindet Länderkatalog und Globus-Orientierung zu einer Spielsitzung.
#[derive(Resource, Debug, Clone)]
pub struct GlobeSession {
    catalog: CountryCatalog,
    controller: OrientationController,
}

impl GlobeSession {
    pub fn new(catalog: CountryCatalog, controller: OrientationController) -> Self {
        Self {
            catalog,
            controller,
        }
    }

    pub fn catalog(&self) -> &CountryCatalog {
        &self.catalog
    }

    pub fn controller(&self) -> &OrientationController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut OrientationController {
        &mut self.controller
    }

    /// Richtungsvektor zum Mittelpunkt eines Landes.
    pub fn country_center(&self, code: &str) -> CatalogResult<Option<Vec3>> {
        self.catalog
            .get_by_code(code)
            .map(|record| record.center())
            .ok_or_else(|| CatalogError::UnknownCode {
                code: code.to_string(),
            })
    }

    /// Dreht den Globus zum Land `code`.
    ///
    /// Während des Drehens ist die Steuerung gesperrt. Ein unbekannter Code
    /// bricht ab, bevor der Controller berührt wird.
    pub fn orient_to_country(&mut self, code: &str, now: f32) -> SessionResult<()> {
        let center = self
            .country_center(code)?
            .ok_or(OrientationError::DegenerateCenter)?;
        self.controller.orient_to(center, now)?;
        Ok(())
    }

    pub fn highlight(&mut self, code: &str) -> CatalogResult<()> {
        self.catalog.set_visual_state(code, VisualState::Target)
    }

    pub fn mark_wrong(&mut self, code: &str) -> CatalogResult<()> {
        self.catalog.set_visual_state(code, VisualState::WrongGuess)
    }

    pub fn mark_correct(&mut self, code: &str) -> CatalogResult<()> {
        self.catalog.set_visual_state(code, VisualState::CorrectGuess)
    }

    pub fn reset_highlights(&mut self) {
        self.catalog.reset_visual_states();
    }

    /// Alle Teilnetze aller Länder mit ihrer aktuellen Darstellung.
    pub fn draw_items(&self) -> impl Iterator<Item = DrawItem<'_>> {
        self.catalog.iter().flat_map(|record| {
            let appearance = record.appearance();
            record.meshes.iter().map(move |mesh| DrawItem {
                code: record.code.as_str(),
                mesh,
                appearance,
            })
        })
    }

    pub fn orientation(&self) -> Quat {
        self.controller.orientation()
    }

    pub fn camera_distance(&self) -> f32 {
        self.controller.zoom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::{
        catalog::tests::sample_catalog, config::OrientationConfig, error::SessionError,
        orientation::OrientationPhase,
    };

    fn session() -> GlobeSession {
        GlobeSession::new(
            sample_catalog(),
            OrientationController::new(OrientationConfig::default(), 0.4),
        )
    }

    #[test]
    fn test_orient_to_known_country() {
        let mut session = session();
        session.orient_to_country("tl", 0.0).unwrap();
        assert!(session.controller().is_animating());
        assert!(!session.controller().accepts_input());

        let mut now = 0.0;
        while session.controller().is_animating() {
            now += 0.1;
            session.controller_mut().step(now);
        }
        let center = session.country_center("TL").unwrap().unwrap();
        assert!((session.orientation() * center).abs_diff_eq(Vec3::Z, 1e-4));
        assert!(session.controller().accepts_input());
    }

    #[test]
    fn test_unknown_country_leaves_controls_alone() {
        let mut session = session();
        let before = session.orientation();
        assert_eq!(
            session.orient_to_country("XX", 0.0),
            Err(SessionError::Catalog(CatalogError::UnknownCode {
                code: "XX".to_string()
            }))
        );
        assert_eq!(session.controller().phase(), OrientationPhase::Idle);
        assert_eq!(session.orientation(), before);
    }

    #[test]
    fn test_second_orient_is_rejected() {
        let mut session = session();
        session.orient_to_country("TL", 0.0).unwrap();
        assert_eq!(
            session.orient_to_country("OL", 0.1),
            Err(SessionError::Orientation(OrientationError::AnimationInFlight))
        );
    }

    #[test]
    fn test_highlights_show_up_in_draw_items() {
        let mut session = session();
        session.highlight("TL").unwrap();
        session.mark_wrong("OL").unwrap();

        let items: Vec<_> = session.draw_items().collect();
        // FJ besteht aus zwei Teilnetzen
        assert_eq!(items.len(), 4);
        for item in &items {
            let expected = match item.code {
                "TL" => 0x00FF00,
                "OL" => 0xFF0000,
                _ => session.catalog().get_by_code(item.code).unwrap().original_color,
            };
            assert_eq!(item.appearance.rgb, expected);
        }

        session.reset_highlights();
        assert!(
            session
                .draw_items()
                .all(|item| item.appearance.opacity < 1.0)
        );
    }

    #[test]
    fn test_camera_distance_follows_zoom() {
        let mut session = session();
        session.controller_mut().zoom_by(1.5);
        assert!((session.camera_distance() - 6.5).abs() < 1e-6);
    }
}
