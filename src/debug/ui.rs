// ./src/debug/ui.rs
use crate::debug::visualization::outline::DebugOverlay;
use crate::globe::{GameFacade, GlobeSession, GuessOutcome};
use crate::math::geometry::sphere::projection::unproject;
use crate::math::probability::{SeedChangedEvent, SeedResource};
use crate::math::utils::angles::rad_to_deg;
use bevy::prelude::*;
use bevy_egui::EguiContexts;
use egui::{Key, ScrollArea, Window};

/// Maximale Anzahl angezeigter Vorschläge.
const SUGGESTION_LIMIT: usize = 8;

/// Inhalt des Ratefelds und die Rückmeldung zum letzten Versuch.
#[derive(Resource, Debug, Default, Clone)]
pub struct GuessInput {
    pub text: String,
    pub feedback: Option<String>,
}

enum PanelAction {
    Guess(String),
    NewRound,
    ResetView,
    NewSeed,
}

/// Ländernamen, die zu `query` passen: erst Treffer am Wortanfang, dann
/// Treffer irgendwo im Namen. Groß-/Kleinschreibung spielt keine Rolle.
pub fn suggest<'a>(names: &[&'a str], query: &str, limit: usize) -> Vec<&'a str> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let (prefix, rest): (Vec<&str>, Vec<&str>) = names
        .iter()
        .copied()
        .filter(|name| name.to_lowercase().contains(&query))
        .partition(|name| name.to_lowercase().starts_with(&query));

    let mut seen = Vec::new();
    for name in prefix.into_iter().chain(rest) {
        if !seen.contains(&name) {
            seen.push(name);
        }
        if seen.len() == limit {
            break;
        }
    }
    seen
}

pub fn game_panel_ui_system(
    mut contexts: EguiContexts,
    session: Option<ResMut<GlobeSession>>,
    mut game: ResMut<GameFacade>,
    mut seed: ResMut<SeedResource>,
    mut input: ResMut<GuessInput>,
    mut overlay: ResMut<DebugOverlay>,
    mut seed_events: EventWriter<SeedChangedEvent>,
    time: Res<Time>,
) {
    let Some(mut session) = session else {
        return;
    };
    let now = time.elapsed_seconds();

    let names: Vec<String> = session
        .catalog()
        .all_display_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let controller = session.controller();
    let mut controls_enabled = controller.controls_enabled();
    let phase = format!("{:?}", controller.phase());
    let (yaw, pitch, zoom) = (controller.yaw(), controller.pitch(), controller.zoom());
    let target_center = game
        .target()
        .and_then(|code| session.country_center(code).ok().flatten())
        .map(unproject);

    let mut action = None;
    Window::new("Länderquiz")
        .default_width(320.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("Welches Land ist markiert?");

            let response = ui.text_edit_singleline(&mut input.text);
            if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                action = Some(PanelAction::Guess(input.text.clone()));
            }

            let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let suggestions = suggest(&name_refs, &input.text, SUGGESTION_LIMIT);
            if !suggestions.is_empty() {
                ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                    for name in suggestions {
                        if ui.button(name).clicked() {
                            action = Some(PanelAction::Guess(name.to_string()));
                        }
                    }
                });
            }

            if let Some(feedback) = &input.feedback {
                ui.label(feedback);
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Neue Runde").clicked() {
                    action = Some(PanelAction::NewRound);
                }
                if ui.button("Ansicht zurücksetzen").clicked() {
                    action = Some(PanelAction::ResetView);
                }
                if ui.button("Neuer Seed").clicked() {
                    action = Some(PanelAction::NewSeed);
                }
            });

            ui.collapsing("Globus & Debug", |ui| {
                ui.label(format!("Phase: {phase}"));
                ui.label(format!(
                    "Gier {:.1}°  Neigung {:.1}°  Abstand {:.2}",
                    rad_to_deg(yaw),
                    rad_to_deg(pitch),
                    zoom
                ));
                match target_center {
                    Some(center) => ui.label(format!(
                        "Zielmitte: {:.2}° N, {:.2}° O",
                        center.y, center.x
                    )),
                    None => ui.label("Kein Ziel"),
                };
                ui.label(format!("Seed: {}", seed.seed));
                ui.checkbox(&mut controls_enabled, "Steuerung aktiv");
                ui.checkbox(&mut overlay.show_outlines, "Umrisse zeichnen");
                ui.separator();
                ui.label("Linke Maustaste + Ziehen: Drehen");
                ui.label("Pfeiltasten: Drehen, +/-: Zoom, Mausrad: Zoom");
            });
        });

    if controls_enabled != session.controller().controls_enabled() {
        session.controller_mut().set_controls_enabled(controls_enabled);
    }

    match action {
        Some(PanelAction::Guess(name)) => match game.submit_guess(&mut session, &name, now) {
            Ok(outcome) => {
                let verdict = match outcome {
                    GuessOutcome::Correct => "Richtig",
                    GuessOutcome::Wrong => "Falsch",
                };
                input.feedback = Some(format!("{verdict}: {}", name.trim()));
                input.text.clear();
            }
            Err(err) => input.feedback = Some(err.to_string()),
        },
        Some(PanelAction::NewRound) => {
            input.feedback = None;
            if let Err(err) = game.start_round(&mut session, seed.rng_mut(), now) {
                input.feedback = Some(err.to_string());
            }
        }
        Some(PanelAction::ResetView) => {
            if let Err(err) = game.reset_view(&mut session, now) {
                input.feedback = Some(err.to_string());
            }
        }
        Some(PanelAction::NewSeed) => {
            let new_seed = rand::random::<u64>();
            seed_events.send(SeedChangedEvent { new_seed });
        }
        None => {}
    }
}
