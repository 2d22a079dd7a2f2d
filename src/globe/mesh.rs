// src/globe/mesh.rs

use crate::math::{
    error::{MathError, MathResult},
    geometry::{
        polygon::{PolygonTriangulator, TriangulationAlgorithm},
        sphere::projection::{SphereProjector, tangent_basis},
    },
    types::*,
    utils::constants,
};
use bevy::log::{debug, warn};
use bevy::render::{
    mesh::{Indices, Mesh, PrimitiveTopology},
    render_asset::RenderAssetUsages,
};
use geo::{BoundingRect, LineString, coord};
use std::collections::{BTreeMap, HashMap};

/// Indiziertes Dreiecksnetz auf der Kugeloberfläche.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Prüft, dass jeder Index auf einen Vertex zeigt und kein Dreieck entartet ist.
    pub fn validate(&self) -> MathResult<()> {
        let vertex_count = self.vertices.len();
        for (i, triangle) in self.indices.iter().enumerate() {
            if let Some(index) = triangle.iter().find(|&&index| index as usize >= vertex_count) {
                return Err(MathError::InvalidMesh {
                    reason: format!(
                        "triangle {i} references vertex {index}, mesh has {vertex_count}"
                    ),
                });
            }
            let [a, b, c] = *triangle;
            if a == b || b == c || a == c {
                return Err(MathError::InvalidMesh {
                    reason: format!("triangle {i} repeats a vertex: {triangle:?}"),
                });
            }
        }
        Ok(())
    }

    /// Normale eines Dreiecks nach der Rechte-Hand-Regel.
    pub fn face_normal(&self, triangle: [u32; 3]) -> Vec3 {
        let [a, b, c] = triangle.map(|i| self.vertices[i as usize]);
        (b - a).cross(c - a)
    }

    /// Wandelt das Netz in ein Bevy-Mesh um. Normalen zeigen radial nach außen.
    pub fn to_bevy_mesh(&self) -> Mesh {
        let positions: Vec<[f32; 3]> = self.vertices.iter().map(|v| v.to_array()).collect();
        let normals: Vec<[f32; 3]> = self
            .vertices
            .iter()
            .map(|v| v.normalize_or_zero().to_array())
            .collect();
        let indices: Vec<u32> = self.indices.iter().flatten().copied().collect();

        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_indices(Indices::U32(indices))
    }
}

/// Erzeugt Dreiecksnetze aus geografischen Ringen auf einer Kugel.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceMesher {
    projector: SphereProjector,
    triangulator: PolygonTriangulator,
    fallback: PolygonTriangulator,
}

impl SurfaceMesher {
    pub fn new(radius: f32) -> Self {
        Self {
            projector: SphereProjector::new(radius),
            triangulator: PolygonTriangulator::new(TriangulationAlgorithm::EarClipping),
            fallback: PolygonTriangulator::new(TriangulationAlgorithm::ConstrainedDelaunay),
        }
    }

    pub fn radius(&self) -> f32 {
        self.projector.radius()
    }

    /// Trianguliert einen Ring auf der Kugeloberfläche.
    ///
    /// Die Punkte werden projiziert und in der Tangentialebene am Schwerpunkt
    /// trianguliert. Alle Dreiecke sind von außen gesehen gegen den
    /// Uhrzeigersinn orientiert. Ringe mit weniger als drei verschiedenen
    /// Punkten ergeben ein leeres Netz, ebenso Ringe, die keiner der beiden
    /// Algorithmen zerlegen kann.
    pub fn triangulate(&self, ring: &Ring) -> TriangleMesh {
        let points = sanitize_ring(ring);
        if points.len() < 3 {
            return TriangleMesh::default();
        }

        let positions: Vec<DVec3> = points
            .iter()
            .map(|point| self.projector.project_f64(*point))
            .collect();
        let centroid = positions.iter().copied().sum::<DVec3>() / positions.len() as f64;
        let normal = centroid
            .try_normalize()
            .unwrap_or_else(|| positions[0].normalize_or_zero());
        let (tangent, bitangent) = tangent_basis(normal);

        let planar: Vec<Point2D> = positions
            .iter()
            .map(|p| {
                let offset = *p - centroid;
                Point2D::new(offset.dot(tangent), offset.dot(bitangent))
            })
            .collect();

        let triangles = match self.triangulator.triangulate_indices(&planar) {
            Ok(triangles) => triangles,
            Err(err) => {
                debug!("Ear clipping failed ({err}), falling back to constrained Delaunay");
                match self.fallback.triangulate_indices(&planar) {
                    Ok(triangles) => triangles,
                    Err(err) => {
                        warn!("Ring with {} points could not be triangulated: {err}", points.len());
                        Vec::new()
                    }
                }
            }
        };

        let indices = triangles
            .into_iter()
            .filter(|&[a, b, c]| a != b && b != c && a != c)
            .map(|[a, b, c]| {
                // Bei großen Ringen faltet die Tangentialebene, daher entscheidet die Normale im Raum
                let (va, vb, vc) = (positions[a], positions[b], positions[c]);
                if (vb - va).cross(vc - va).dot(va + vb + vc) < 0.0 {
                    [a as u32, c as u32, b as u32]
                } else {
                    [a as u32, b as u32, c as u32]
                }
            })
            .collect();

        TriangleMesh {
            vertices: positions.iter().map(|p| p.as_vec3()).collect(),
            indices,
        }
    }
}

/// Entfernt den Schlusspunkt und direkt aufeinanderfolgende Duplikate.
fn sanitize_ring(ring: &Ring) -> Vec<GeoPoint> {
    let mut points: Vec<GeoPoint> = Vec::with_capacity(ring.0.len());
    for coord in ring.coords() {
        if points.last().is_some_and(|last| same_point(*last, *coord)) {
            continue;
        }
        points.push(*coord);
    }
    while points.len() > 1 && same_point(points[0], points[points.len() - 1]) {
        points.pop();
    }
    points
}

fn same_point(a: GeoPoint, b: GeoPoint) -> bool {
    (a.x - b.x).abs() < constants::EPSILON_F64 && (a.y - b.y).abs() < constants::EPSILON_F64
}

/// Ein Land gilt als groß, wenn seine Ausdehnung 90° Länge oder 45° Breite übersteigt.
///
/// Negative Längengrade werden vorher um 360° verschoben, damit Ringe an der
/// Datumsgrenze nicht fälschlich die halbe Welt umspannen. Kleine Ringe über
/// dem Nullmeridian (etwa −8° bis 2°) gelten dadurch als groß.
pub fn is_large_country(ring: &Ring) -> bool {
    let shifted: LineString<f64> = ring
        .coords()
        .map(|c| coord! { x: if c.x < 0.0 { c.x + 360.0 } else { c.x }, y: c.y })
        .collect();

    shifted
        .bounding_rect()
        .is_some_and(|rect| rect.width() > 90.0 || rect.height() > 45.0)
}

/// Schließt Löcher im Netz durch Fächer um den Mittelpunkt jeder Lochkante.
///
/// Randkanten (von genau einem Dreieck benutzt) werden entlang ihrer
/// Orientierung zu geschlossenen Schleifen verkettet. Schleifen, die wie der
/// Außenrand gegen den Uhrzeigersinn laufen, bleiben offen. Offene Ketten und
/// Schleifen mit höchstens zwei Punkten werden ignoriert.
pub fn fill_holes(mesh: &TriangleMesh) -> TriangleMesh {
    let mut edge_use: HashMap<(u32, u32), usize> = HashMap::new();
    for triangle in &mesh.indices {
        for (a, b) in directed_edges(*triangle) {
            *edge_use.entry(undirected(a, b)).or_default() += 1;
        }
    }

    let mut outgoing: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for triangle in &mesh.indices {
        for (a, b) in directed_edges(*triangle) {
            if edge_use.get(&undirected(a, b)) == Some(&1) {
                outgoing.entry(a).or_default().push(b);
            }
        }
    }

    let mut result = mesh.clone();
    for boundary in chain_boundary_loops(outgoing) {
        if boundary.len() <= 2 {
            continue;
        }

        let points: Vec<Vec3> = boundary
            .iter()
            .map(|&i| mesh.vertices[i as usize])
            .collect();
        let center = points.iter().copied().sum::<Vec3>() / points.len() as f32;
        if newell_normal(&points).dot(center) >= 0.0 {
            continue;
        }

        let center_index = result.vertices.len() as u32;
        result.vertices.push(center);
        for (i, &a) in boundary.iter().enumerate() {
            let b = boundary[(i + 1) % boundary.len()];
            result.indices.push([b, a, center_index]);
        }
        debug!("Filled mesh hole with {} boundary vertices", boundary.len());
    }
    result
}

fn directed_edges([a, b, c]: [u32; 3]) -> [(u32, u32); 3] {
    [(a, b), (b, c), (c, a)]
}

fn undirected(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

/// Verkettet gerichtete Randkanten zu Schleifen; nicht geschlossene Ketten fallen weg.
fn chain_boundary_loops(mut outgoing: BTreeMap<u32, Vec<u32>>) -> Vec<Vec<u32>> {
    let mut loops = Vec::new();

    while let Some(start) = outgoing
        .iter()
        .find(|(_, targets)| !targets.is_empty())
        .map(|(&vertex, _)| vertex)
    {
        let mut chain = vec![start];
        let mut current = start;
        let closed = loop {
            let Some(next) = outgoing.get_mut(&current).and_then(|targets| targets.pop()) else {
                break false;
            };
            if next == start {
                break true;
            }
            chain.push(next);
            current = next;
        };

        if closed {
            loops.push(chain);
        }
    }
    loops
}

/// Flächennormale eines (nicht notwendig ebenen) Polygons nach Newell.
fn newell_normal(points: &[Vec3]) -> Vec3 {
    let mut normal = Vec3::ZERO;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal
}
