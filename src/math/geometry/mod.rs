// src/math/geometry/mod.rs

// Deklaration der Haupt-Geometriemodule
pub mod polygon;
pub mod sphere;

// Re-Exporte für einen schnellen Zugriff auf die Kern-Geometrietypen
pub use self::polygon::triangulation::{PolygonTriangulator, TriangulationAlgorithm};
pub use self::sphere::{AntimeridianSplit, SphereProjector};
