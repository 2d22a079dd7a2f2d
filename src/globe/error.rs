// src/globe/error.rs
use thiserror::Error;

/// Fehler beim Lesen einzelner Features einer FeatureCollection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Feature has no usable ISO_A2 / ISO_A2_EH country code")]
    MissingCountryCode,

    #[error("Feature has no geometry")]
    MissingGeometry,

    #[error("Unsupported geometry type: {kind}")]
    UnsupportedGeometry { kind: String },

    #[error("Malformed coordinates: {reason}")]
    MalformedCoordinates { reason: String },

    #[error("No ring of the feature could be meshed")]
    NoUsableRings,

    #[error("Duplicate country code: {code}")]
    DuplicateCode { code: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Country catalog is empty")]
    EmptyCatalog,

    #[error("Unknown country code: {code}")]
    UnknownCode { code: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrientationError {
    #[error("A country animation is already running")]
    AnimationInFlight,

    #[error("Country center has no direction")]
    DegenerateCenter,
}

/// Fehler der Session-Operationen, die Katalog und Orientierung verbinden.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Orientation(#[from] OrientationError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("No round has been started")]
    NoActiveRound,

    #[error("Unknown country name: {name}")]
    UnknownName { name: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Fehler beim Laden der Länderdaten.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read country data {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Country data {path} is not a GeoJSON FeatureCollection: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type CatalogResult<T> = Result<T, CatalogError>;
pub type SessionResult<T> = Result<T, SessionError>;
pub type GameResult<T> = Result<T, GameError>;
