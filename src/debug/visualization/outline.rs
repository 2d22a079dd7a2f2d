use crate::globe::{GlobeConfig, GlobeSession, VisualState};
use bevy::prelude::*;

/// Schalter für Gizmo-Overlays über dem Globus.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugOverlay {
    pub show_outlines: bool,
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self {
            show_outlines: true,
        }
    }
}

impl DebugOverlay {
    pub fn from_config(config: &GlobeConfig) -> Self {
        Self {
            show_outlines: config.show_outlines,
        }
    }
}

fn outline_color(state: VisualState) -> Color {
    match state {
        VisualState::Neutral => Color::rgba(1.0, 1.0, 1.0, 0.6),
        _ => Color::WHITE,
    }
}

/// Zeichnet die Umrisse aller Länder als Gizmo-Linienzüge.
///
/// Die Umrisse liegen im Koordinatensystem des Globus und werden mit dessen
/// aktueller Orientierung gedreht.
pub fn draw_country_outlines_system(
    session: Option<Res<GlobeSession>>,
    overlay: Res<DebugOverlay>,
    mut gizmos: Gizmos,
) {
    let Some(session) = session else {
        return;
    };
    if !overlay.show_outlines {
        return;
    }

    let orientation = session.orientation();
    for record in session.catalog().iter() {
        let color = outline_color(record.visual_state);
        for outline in &record.outlines {
            if outline.len() < 2 {
                continue;
            }
            gizmos.linestrip(outline.iter().map(|point| orientation * *point), color);
        }
    }
}
