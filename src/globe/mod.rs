// src/globe/mod.rs
pub mod catalog;
pub mod config;
pub mod error;
pub mod feature;
pub mod game;
pub mod mesh;
pub mod orientation;
pub mod plugin;
pub mod session;

pub use catalog::{CountryCatalog, CountryRecord, VisualState};
pub use config::{GlobeConfig, OrientationConfig};
pub use game::{GameFacade, GuessOutcome};
pub use orientation::{OrientationController, OrientationPhase};
pub use plugin::{CountryMesh, GlobeCamera, GlobePlugin, GlobeRoot};
pub use session::GlobeSession;
