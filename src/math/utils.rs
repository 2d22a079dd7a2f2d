// src/math/utils.rs

/// Mathematische Konstanten
pub mod constants {
    pub const EPSILON: f32 = 1e-6;
    pub const EPSILON_F64: f64 = 1e-10;
    pub const TAU: f32 = std::f32::consts::TAU;
    pub const PI: f32 = std::f32::consts::PI;
    pub const PI_OVER_2: f32 = std::f32::consts::FRAC_PI_2;
}

/// Vergleichsfunktionen mit Toleranz
pub mod comparison {
    use super::constants::EPSILON;

    /// Prüft ob zwei Floats (nahezu) gleich sind
    pub fn nearly_equal(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    /// Prüft ob zwei Floats mit custom Toleranz gleich sind
    pub fn nearly_equal_eps(a: f32, b: f32, epsilon: f32) -> bool {
        (a - b).abs() < epsilon
    }

    /// Prüft ob Float (nahezu) Null ist
    pub fn nearly_zero(a: f32) -> bool {
        a.abs() < EPSILON
    }
}

/// Winkel-Hilfsfunktionen
pub mod angles {
    use super::constants::{PI, TAU};

    /// Konvertiert Grad zu Radiant
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * PI / 180.0
    }

    /// Konvertiert Radiant zu Grad
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * 180.0 / PI
    }

    /// Normalisiert einen Winkel auf (-π, π]
    pub fn normalize_angle_signed(angle: f32) -> f32 {
        let mut result = angle % TAU;
        if result > PI {
            result -= TAU;
        } else if result <= -PI {
            result += TAU;
        }
        result
    }

    /// Berechnet den kleinsten Winkelunterschied von `a` nach `b`
    pub fn angle_difference(a: f32, b: f32) -> f32 {
        normalize_angle_signed(b - a)
    }
}

/// Easing-Funktionen für Animationen
pub mod easing {
    /// Linear easing (keine Beschleunigung)
    pub fn linear(t: f32) -> f32 {
        t.clamp(0.0, 1.0)
    }

    /// Cubic ease-in-out
    pub fn ease_in_out_cubic(t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t < 0.5 {
            4.0 * t * t * t
        } else {
            1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
        }
    }
}
