use bevy::prelude::*;

/// Fordert einen neuen Zufalls-Seed an. Auslöser ist z.B. der "Neuer Seed"-Knopf im Spielpanel.
#[derive(Event, Debug, Clone)]
pub struct SeedChangedEvent {
    pub new_seed: u64,
}
