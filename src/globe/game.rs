// src/globe/game.rs

use super::{
    error::{GameError, GameResult},
    session::GlobeSession,
};
use bevy::log::{debug, info};
use bevy::prelude::Resource;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct,
    Wrong,
}

/// Schmale Spiel-Schnittstelle über der [`GlobeSession`]: Runde starten, raten.
#[derive(Resource, Debug, Clone, Default)]
pub struct GameFacade {
    target: Option<String>,
}

impl GameFacade {
    /// Code des aktuell gesuchten Landes.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Wählt ein zufälliges Zielland, markiert es und dreht den Globus dorthin.
    pub fn start_round(
        &mut self,
        session: &mut GlobeSession,
        rng: &mut impl Rng,
        now: f32,
    ) -> GameResult<String> {
        let code = session.catalog().random_country(rng)?.code.clone();

        session.reset_highlights();
        session.highlight(&code)?;
        if let Err(err) = session.orient_to_country(&code, now) {
            debug!("Round target {code} stays unrotated: {err}");
        }

        info!("New round, target {code}");
        self.target = Some(code.clone());
        Ok(code)
    }

    /// Prüft einen geratenen Ländernamen und markiert das geratene Land.
    pub fn submit_guess(
        &mut self,
        session: &mut GlobeSession,
        name: &str,
        now: f32,
    ) -> GameResult<GuessOutcome> {
        let target = self.target.clone().ok_or(GameError::NoActiveRound)?;
        let guessed = session
            .catalog()
            .get_by_name(name)
            .map(|record| record.code.clone())
            .ok_or_else(|| GameError::UnknownName {
                name: name.trim().to_string(),
            })?;

        if let Err(err) = session.orient_to_country(&guessed, now) {
            debug!("Guess {guessed} stays unrotated: {err}");
        }

        if guessed == target {
            session.mark_correct(&guessed)?;
            info!("Correct guess: {guessed}");
            Ok(GuessOutcome::Correct)
        } else {
            session.mark_wrong(&guessed)?;
            info!("Wrong guess: {guessed}, target was {target}");
            Ok(GuessOutcome::Wrong)
        }
    }

    /// Dreht den Globus zurück zum aktuellen Zielland.
    pub fn reset_view(&self, session: &mut GlobeSession, now: f32) -> GameResult<()> {
        let target = self.target.as_deref().ok_or(GameError::NoActiveRound)?;
        if let Err(err) = session.orient_to_country(target, now) {
            debug!("Reset view ignored: {err}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::{
        catalog::{CountryCatalog, VisualState, tests::sample_catalog},
        config::OrientationConfig,
        error::CatalogError,
        orientation::OrientationController,
    };
    use rand::{SeedableRng, rngs::StdRng};

    fn session_with(catalog: CountryCatalog) -> GlobeSession {
        GlobeSession::new(
            catalog,
            OrientationController::new(OrientationConfig::default(), 0.0),
        )
    }

    fn settle(session: &mut GlobeSession, mut now: f32) -> f32 {
        while session.controller().is_animating() {
            now += 0.25;
            session.controller_mut().step(now);
        }
        now
    }

    fn state(session: &GlobeSession, code: &str) -> VisualState {
        session.catalog().get_by_code(code).unwrap().visual_state
    }

    #[test]
    fn test_start_round_highlights_target() {
        let mut session = session_with(sample_catalog());
        let mut game = GameFacade::default();
        let mut rng = StdRng::seed_from_u64(9);

        let target = game.start_round(&mut session, &mut rng, 0.0).unwrap();
        assert_eq!(game.target(), Some(target.as_str()));
        assert_eq!(state(&session, &target), VisualState::Target);
        assert!(session.controller().is_animating());
        let highlighted = session
            .catalog()
            .iter()
            .filter(|r| r.visual_state != VisualState::Neutral)
            .count();
        assert_eq!(highlighted, 1);
    }

    #[test]
    fn test_correct_and_wrong_guesses() {
        let mut session = session_with(sample_catalog());
        let mut game = GameFacade::default();
        let mut rng = StdRng::seed_from_u64(1);

        let target = game.start_round(&mut session, &mut rng, 0.0).unwrap();
        let now = settle(&mut session, 0.0);

        let target_name = session
            .catalog()
            .get_by_code(&target)
            .unwrap()
            .display_name()
            .to_string();
        let wrong_name = session
            .catalog()
            .iter()
            .find(|r| r.code != target)
            .map(|r| r.display_name().to_string())
            .unwrap();
        let wrong_code = session.catalog().get_by_name(&wrong_name).unwrap().code.clone();

        assert_eq!(
            game.submit_guess(&mut session, &wrong_name, now),
            Ok(GuessOutcome::Wrong)
        );
        assert_eq!(state(&session, &wrong_code), VisualState::WrongGuess);
        let now = settle(&mut session, now);

        assert_eq!(
            game.submit_guess(&mut session, &target_name.to_uppercase(), now),
            Ok(GuessOutcome::Correct)
        );
        assert_eq!(state(&session, &target), VisualState::CorrectGuess);

        let now = settle(&mut session, now);
        game.start_round(&mut session, &mut rng, now).unwrap();
        assert_ne!(state(&session, &wrong_code), VisualState::WrongGuess);
    }

    #[test]
    fn test_unknown_name() {
        let mut session = session_with(sample_catalog());
        let mut game = GameFacade::default();
        let mut rng = StdRng::seed_from_u64(2);
        game.start_round(&mut session, &mut rng, 0.0).unwrap();

        assert_eq!(
            game.submit_guess(&mut session, "  Atlantis ", 0.0),
            Err(GameError::UnknownName {
                name: "Atlantis".to_string()
            })
        );
    }

    #[test]
    fn test_guess_without_round() {
        let mut session = session_with(sample_catalog());
        let mut game = GameFacade::default();
        assert_eq!(
            game.submit_guess(&mut session, "Testland", 0.0),
            Err(GameError::NoActiveRound)
        );
        assert_eq!(game.reset_view(&mut session, 0.0), Err(GameError::NoActiveRound));
    }

    #[test]
    fn test_empty_catalog() {
        let mut session = session_with(CountryCatalog::default());
        let mut game = GameFacade::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            game.start_round(&mut session, &mut rng, 0.0),
            Err(GameError::Catalog(CatalogError::EmptyCatalog))
        );
        assert_eq!(game.target(), None);
    }
}
