// src/math/geometry/polygon/mod.rs

pub mod triangulation;

pub use self::triangulation::{PolygonTriangulator, TriangulationAlgorithm, signed_area};
