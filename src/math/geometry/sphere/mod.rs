// src/math/geometry/sphere/mod.rs

// Deklaration der Untermodule für Kugel-spezifische Funktionalität
pub mod antimeridian;
pub mod projection;

// Re-Exporte für den einfachen Zugriff auf die wichtigsten Kugel-Elemente
pub use self::antimeridian::{AntimeridianSplit, crosses_antimeridian, split_at_antimeridian};
pub use self::projection::{SphereProjector, project, project_f64, tangent_basis, unproject};
