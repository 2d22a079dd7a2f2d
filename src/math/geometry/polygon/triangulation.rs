// src/math/geometry/polygon/triangulation.rs

use crate::math::{
    error::{MathError, MathResult},
    types::*,
};
use geo::{Contains, LineString, Polygon};
use spade::{ConstrainedDelaunayTriangulation, Triangulation};
use std::collections::HashMap;

/// Verschiedene Algorithmen zur Triangulation eines einfachen Polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriangulationAlgorithm {
    /// Ear Clipping Algorithmus (O(n^2) Komplexität, robust für einfache Polygone).
    #[default]
    EarClipping,
    /// Eingeschränkte Delaunay-Triangulation über `spade`. Dreiecke, deren
    /// Schwerpunkt außerhalb des Rings liegt, werden verworfen. Kommt auch mit
    /// sich berührenden oder leicht überschneidenden Ringen zurecht.
    ConstrainedDelaunay,
}

/// Führt die Triangulation eines Polygons (definiert durch seine Eckpunkte) durch.
///
/// Ergebnis sind Indextripel in die Eingabe. Die Dreiecke haben die
/// Orientierung des Eingabepolygons, wenn dieses einfach ist.
#[derive(Debug, Clone, Copy)]
pub struct PolygonTriangulator {
    algorithm: TriangulationAlgorithm,
    tolerance: f64,
}

impl Default for PolygonTriangulator {
    fn default() -> Self {
        Self {
            algorithm: TriangulationAlgorithm::default(),
            tolerance: 1e-12,
        }
    }
}

impl PolygonTriangulator {
    pub fn new(algorithm: TriangulationAlgorithm) -> Self {
        Self {
            algorithm,
            ..Default::default()
        }
    }

    /// Trianguliert das durch `vertices` gegebene Polygon.
    /// Der letzte Punkt sollte NICHT mit dem ersten identisch sein.
    pub fn triangulate_indices(&self, vertices: &[Point2D]) -> MathResult<Vec<[usize; 3]>> {
        if vertices.len() < 3 {
            return Err(MathError::InsufficientPoints {
                expected: 3,
                actual: vertices.len(),
            });
        }

        match self.algorithm {
            TriangulationAlgorithm::EarClipping => self.ear_clipping(vertices),
            TriangulationAlgorithm::ConstrainedDelaunay => self.constrained_delaunay(vertices),
        }
    }

    // --- Ear Clipping Algorithmus ---
    fn ear_clipping(&self, vertices: &[Point2D]) -> MathResult<Vec<[usize; 3]>> {
        let n_initial = vertices.len();
        let mut remaining: Vec<usize> = (0..n_initial).collect();
        let mut triangles = Vec::with_capacity(n_initial - 2);

        // Bestimme Orientierung, um konsistente "Links"-Turns zu identifizieren
        let is_ccw = signed_area(vertices) > 0.0;
        let tolerance = self.tolerance * extent_squared(vertices);

        let mut iteration_limit = n_initial * n_initial;

        while remaining.len() > 3 {
            if iteration_limit == 0 {
                return Err(MathError::TriangulationFailed {
                    reason: "Ear Clipping iteration limit reached.".to_string(),
                });
            }
            iteration_limit -= 1;

            let current_n = remaining.len();
            let mut ear_found_this_pass = false;

            for i in 0..current_n {
                let idx_prev = remaining[(i + current_n - 1) % current_n];
                let idx_curr = remaining[i];
                let idx_next = remaining[(i + 1) % current_n];

                let p_prev = vertices[idx_prev];
                let p_curr = vertices[idx_curr];
                let p_next = vertices[idx_next];

                let cross = (p_curr - p_prev).perp_dot(p_next - p_prev);
                let turn = if is_ccw { cross } else { -cross };

                // Kollineare Ecken tragen keine Fläche bei
                if turn.abs() <= tolerance {
                    remaining.remove(i);
                    ear_found_this_pass = true;
                    break;
                }
                if turn < 0.0 {
                    continue;
                }

                let blocked = remaining.iter().any(|&k| {
                    let p = vertices[k];
                    k != idx_prev
                        && k != idx_curr
                        && k != idx_next
                        && p != p_prev
                        && p != p_curr
                        && p != p_next
                        && triangle_contains(p_prev, p_curr, p_next, p)
                });

                if !blocked {
                    triangles.push([idx_prev, idx_curr, idx_next]);
                    remaining.remove(i);
                    ear_found_this_pass = true;
                    break;
                }
            }

            if !ear_found_this_pass {
                return Err(MathError::TriangulationFailed {
                    reason: "No ear found during Ear Clipping (polygon might be self-intersecting)."
                        .to_string(),
                });
            }
        }

        // Das verbleibende Polygon ist ein Dreieck
        if let [a, b, c] = remaining[..] {
            let cross = (vertices[b] - vertices[a]).perp_dot(vertices[c] - vertices[a]);
            if cross.abs() > tolerance {
                triangles.push([a, b, c]);
            }
        }
        Ok(triangles)
    }

    // --- Eingeschränkte Delaunay-Triangulation ---
    fn constrained_delaunay(&self, vertices: &[Point2D]) -> MathResult<Vec<[usize; 3]>> {
        let mut cdt: ConstrainedDelaunayTriangulation<SpadePoint> =
            ConstrainedDelaunayTriangulation::new();

        let mut handles = Vec::with_capacity(vertices.len());
        // Doppelte Punkte teilen sich einen Handle, der erste Index gewinnt
        let mut index_of_handle: HashMap<usize, usize> = HashMap::new();
        for (i, v) in vertices.iter().enumerate() {
            let handle = cdt
                .insert(SpadePoint::new(v.x, v.y))
                .map_err(|err| MathError::TriangulationFailed {
                    reason: format!("spade rejected vertex {i}: {err:?}"),
                })?;
            index_of_handle.entry(handle.index()).or_insert(i);
            handles.push(handle);
        }

        for i in 0..handles.len() {
            let from = handles[i];
            let to = handles[(i + 1) % handles.len()];
            if from != to && cdt.can_add_constraint(from, to) {
                cdt.add_constraint(from, to);
            }
        }

        let outline = Polygon::new(
            LineString::from(vertices.iter().map(|v| (v.x, v.y)).collect::<Vec<_>>()),
            vec![],
        );

        let mut triangles = Vec::new();
        for face in cdt.inner_faces() {
            let corners = face.vertices();
            let positions = corners.map(|vertex| vertex.position());
            let centroid = geo::Point::new(
                (positions[0].x + positions[1].x + positions[2].x) / 3.0,
                (positions[0].y + positions[1].y + positions[2].y) / 3.0,
            );
            if !outline.contains(&centroid) {
                continue;
            }

            let indices = corners.map(|vertex| index_of_handle.get(&vertex.fix().index()).copied());
            if let [Some(a), Some(b), Some(c)] = indices {
                triangles.push([a, b, c]);
            }
        }

        if triangles.is_empty() {
            return Err(MathError::TriangulationFailed {
                reason: "Constrained Delaunay produced no interior faces.".to_string(),
            });
        }
        Ok(triangles)
    }
}

/// Vorzeichenbehaftete Fläche eines Polygons (positiv für CCW).
pub fn signed_area(vertices: &[Point2D]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let doubled: f64 = (0..n)
        .map(|i| vertices[i].perp_dot(vertices[(i + 1) % n]))
        .sum();
    doubled * 0.5
}

/// Quadrat der größten Achsenausdehnung, Maßstab für die Kollinearitätstoleranz.
fn extent_squared(vertices: &[Point2D]) -> f64 {
    let (min, max) = vertices.iter().fold(
        (Point2D::splat(f64::MAX), Point2D::splat(f64::MIN)),
        |(min, max), v| (min.min(*v), max.max(*v)),
    );
    let extent = (max - min).max_element();
    extent * extent
}

/// Punkt-in-Dreieck-Test inklusive der Kanten, unabhängig von der Orientierung.
fn triangle_contains(a: Point2D, b: Point2D, c: Point2D, p: Point2D) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);

    let has_negative = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_positive = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_negative && has_positive)
}
