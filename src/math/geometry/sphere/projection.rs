// src/math/geometry/sphere/projection.rs

use crate::math::{types::*, utils::constants};

/// Bildet geografische Koordinaten auf Punkte einer Kugel um den Ursprung ab.
///
/// Längengrad 0 liegt auf der +X-Achse, der Nordpol auf +Y, 90° Ost auf −Z.
/// Länderflächen und Umrisslinien werden mit derselben Abbildung erzeugt,
/// nur mit unterschiedlichem Radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereProjector {
    radius: f64,
}

impl SphereProjector {
    /// Erstellt einen neuen Projektor für den angegebenen Radius.
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius as f64,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius as f32
    }

    /// Projiziert einen geografischen Punkt auf die Kugeloberfläche.
    pub fn project(&self, point: GeoPoint) -> Vec3 {
        project(point, self.radius)
    }

    /// Wie [`SphereProjector::project`], aber in doppelter Genauigkeit.
    pub fn project_f64(&self, point: GeoPoint) -> DVec3 {
        project_f64(point, self.radius)
    }

    /// Projiziert alle Punkte eines Rings in Eingabereihenfolge.
    pub fn project_ring(&self, ring: &Ring) -> Vec<Vec3> {
        ring.coords().map(|coord| self.project(*coord)).collect()
    }
}

/// `phi = (90 − lat)°`, `theta = (lon + 180)°`,
/// `(x, y, z) = (−r·sinφ·cosθ, r·cosφ, r·sinφ·sinθ)`.
pub fn project_f64(point: GeoPoint, radius: f64) -> DVec3 {
    let phi = (90.0 - point.y).to_radians();
    let theta = (point.x + 180.0).to_radians();

    DVec3::new(
        -radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

pub fn project(point: GeoPoint, radius: f64) -> Vec3 {
    project_f64(point, radius).as_vec3()
}

/// Umkehrung von [`project`]. Der Längengrad liegt in (−180, 180].
/// Der Ursprung selbst hat keine Richtung und ergibt (0, 0).
pub fn unproject(v: Vec3) -> GeoPoint {
    let v = v.as_dvec3();
    let radius = v.length();
    if radius < constants::EPSILON_F64 {
        return GeoPoint { x: 0.0, y: 0.0 };
    }

    let lat = 90.0 - (v.y / radius).clamp(-1.0, 1.0).acos().to_degrees();
    let mut lon = v.z.atan2(-v.x).to_degrees() - 180.0;
    if lon <= -180.0 {
        lon += 360.0;
    }

    GeoPoint { x: lon, y: lat }
}

/// Erzeugt zwei orthonormale Tangentialvektoren zur Normalen.
///
/// Als Referenz dient die Koordinatenachse, die am wenigsten parallel zur
/// Normalen liegt. `normal`, `tangent`, `bitangent` bilden ein Rechtssystem,
/// d.h. `tangent × bitangent = normal`.
pub fn tangent_basis(normal: DVec3) -> (DVec3, DVec3) {
    let normal = normal.normalize_or_zero();
    let abs = normal.abs();
    let reference = if abs.x <= abs.y && abs.x <= abs.z {
        DVec3::X
    } else if abs.y <= abs.z {
        DVec3::Y
    } else {
        DVec3::Z
    };

    let tangent = (reference - normal * reference.dot(normal)).normalize_or_zero();
    let bitangent = normal.cross(tangent).normalize_or_zero();
    (tangent, bitangent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn geo(lon: f64, lat: f64) -> GeoPoint {
        GeoPoint { x: lon, y: lat }
    }

    #[test]
    fn test_reference_axes() {
        let projector = SphereProjector::new(2.0);

        let prime_meridian = projector.project(geo(0.0, 0.0));
        assert!(prime_meridian.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));

        let north_pole = projector.project(geo(0.0, 90.0));
        assert!(north_pole.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));

        let east = projector.project(geo(90.0, 0.0));
        assert!(east.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-5));
    }

    #[test]
    fn test_projected_points_lie_on_sphere() {
        let projector = SphereProjector::new(2.05);
        for (lon, lat) in [(13.4, 52.5), (-74.0, 40.7), (151.2, -33.9), (179.9, -16.0)] {
            let point = projector.project(geo(lon, lat));
            assert_abs_diff_eq!(point.length(), 2.05, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_unproject_inverts_projection() {
        for (lon, lat) in [
            (13.4, 52.5),
            (-74.0, 40.7),
            (151.2, -33.9),
            (-179.0, 10.0),
            (179.0, -10.0),
        ] {
            let back = unproject(project(geo(lon, lat), 2.0));
            assert_abs_diff_eq!(back.x, lon, epsilon = 1e-3);
            assert_abs_diff_eq!(back.y, lat, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_unproject_origin() {
        assert_eq!(unproject(Vec3::ZERO), geo(0.0, 0.0));
    }

    #[test]
    fn test_tangent_basis_is_orthonormal() {
        for normal in [
            DVec3::X,
            DVec3::new(0.3, -0.8, 0.5).normalize(),
            DVec3::new(0.0, 0.0, -1.0),
        ] {
            let (tangent, bitangent) = tangent_basis(normal);
            assert_abs_diff_eq!(tangent.length(), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(bitangent.length(), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(tangent.dot(normal), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(bitangent.dot(normal), 0.0, epsilon = 1e-12);
            assert!(tangent.cross(bitangent).abs_diff_eq(normal, 1e-12));
        }
    }
}
