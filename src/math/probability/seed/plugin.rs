//! Bevy-`Plugin` für den globalen [`SeedResource`].
//!
//! Initialisiert die Ressource und setzt sie bei einem [`SeedChangedEvent`] neu.

use super::{events::SeedChangedEvent, resource::SeedResource};
use bevy::prelude::*;

pub struct SeedPlugin;

impl Plugin for SeedPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SeedResource>()
            .add_event::<SeedChangedEvent>()
            .add_systems(Update, seed_changed_event_handler);
    }
}

fn seed_changed_event_handler(
    mut events: EventReader<SeedChangedEvent>,
    mut seed_resource: ResMut<SeedResource>,
) {
    for event in events.read() {
        info!(
            "SeedResource is being updated due to SeedChangedEvent: {}",
            event.new_seed
        );
        seed_resource.reset_with_new_seed(event.new_seed);
    }
}
