// src/math/geometry/sphere/antimeridian.rs

use crate::math::{types::*, utils::constants};
use geo::coord;

/// Ergebnis der Teilung eines Rings an der Datumsgrenze (±180°).
///
/// `west` enthält die Punkte mit positivem Längengrad (westlich der
/// Datumsgrenze, also z.B. Fidschis Hauptinseln), `east` die mit negativem.
/// Eine Hälfte mit weniger als drei Punkten ist keine Fläche und fehlt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AntimeridianSplit {
    pub west: Option<Ring>,
    pub east: Option<Ring>,
}

impl AntimeridianSplit {
    /// Alle vorhandenen Teilringe, westlicher Teil zuerst.
    pub fn into_parts(self) -> Vec<Ring> {
        [self.west, self.east].into_iter().flatten().collect()
    }
}

/// Prüft, ob zwei aufeinanderfolgende Punkte mehr als 180° Längendifferenz haben.
pub fn crosses_antimeridian(ring: &Ring) -> bool {
    ring.0
        .windows(2)
        .any(|pair| (pair[1].x - pair[0].x).abs() > 180.0)
}

/// Teilt einen Ring an der Datumsgrenze in einen westlichen und einen östlichen Teil.
///
/// An jedem Übergang wird der Breitengrad auf der "abgewickelten" Länge
/// interpoliert und ein Randpunkt in beide Teile eingefügt (+180 im Westen,
/// −180 im Osten). Alle übrigen Punkte werden nach dem Vorzeichen ihres
/// Längengrads verteilt.
///
/// Der Anteil `t = (180 − |vorher|) / (360 − |Δlänge|)` wird bewusst über die
/// abgewickelte Spanne gemessen und nicht über die rohe Längendifferenz.
///
/// Ringe, die die Datumsgrenze mehrfach in dieselbe Richtung überqueren
/// (z.B. um einen Pol laufende Ringe), werden nur nach Vorzeichen getrennt und
/// ergeben keine sauberen Teilflächen.
pub fn split_at_antimeridian(ring: &Ring) -> AntimeridianSplit {
    let mut west: Vec<GeoPoint> = Vec::new();
    let mut east: Vec<GeoPoint> = Vec::new();

    let Some(first) = ring.0.first() else {
        return AntimeridianSplit::default();
    };
    route(*first, &mut west, &mut east);

    for pair in ring.0.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        let delta = current.x - previous.x;

        if delta.abs() > 180.0 {
            // Abstand zur Grenze relativ zur abgewickelten Strecke
            let span = 360.0 - delta.abs();
            let t = if span < constants::EPSILON_F64 {
                0.0
            } else {
                (180.0 - previous.x.abs()) / span
            };
            let lat = previous.y + t * (current.y - previous.y);

            west.push(coord! { x: 180.0, y: lat });
            east.push(coord! { x: -180.0, y: lat });
        }

        route(current, &mut west, &mut east);
    }

    AntimeridianSplit {
        west: into_part(west),
        east: into_part(east),
    }
}

fn route(point: GeoPoint, west: &mut Vec<GeoPoint>, east: &mut Vec<GeoPoint>) {
    if point.x > 0.0 {
        west.push(point);
    } else {
        east.push(point);
    }
}

fn into_part(points: Vec<GeoPoint>) -> Option<Ring> {
    (points.len() >= 3).then(|| Ring::new(points))
}
