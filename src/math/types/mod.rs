// src/math/types/mod.rs

// Re-export häufig verwendete externe Typen
pub use bevy::math::{DVec2, DVec3, Quat, Vec2, Vec3};
pub use spade::Point2;

/// Geografischer Punkt in Grad: `x` = Längengrad, `y` = Breitengrad.
pub type GeoPoint = geo::Coord<f64>;

/// Folge geografischer Punkte, die einen (Polygon-)Ring beschreibt.
/// Der Schlusspunkt darf fehlen oder dem Startpunkt entsprechen.
pub type Ring = geo::LineString<f64>;

// Einheitliche Typen für das gesamte Modul
pub type Point2D = DVec2;
pub type SpadePoint = Point2<f64>;
