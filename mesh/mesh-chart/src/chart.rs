//! Charts: clusters of faces with running fit statistics.

use nalgebra::Vector3;

use crate::quadric::ErrorQuadric;
use crate::surface::{Face, FaceId};

/// Stable chart identifier, valid for the whole clustering run.
pub type ChartId = u32;

/// A contiguous cluster of faces treated as one quasi-planar patch.
///
/// Charts are created once per face and only ever grow by absorbing other
/// charts. An absorbed chart stays in storage with `active == false` and no
/// faces.
#[derive(Debug, Clone)]
pub struct Chart {
    /// Chart id (its index in the chart arena).
    pub id: ChartId,
    /// Member faces, in merge order.
    pub faces: Vec<FaceId>,
    /// Normal of each member face, parallel to `faces`.
    pub normals: Vec<Vector3<f64>>,
    /// Area of each member face, parallel to `faces`.
    pub areas: Vec<f64>,
    /// Total area.
    pub area: f64,
    /// Boundary length; edges shared by two member faces do not count.
    pub perimeter: f64,
    /// Area-weighted mean face normal, unit length (zero if undefined).
    pub avg_normal: Vector3<f64>,
    /// Point-fit quadric of all member corners.
    pub p_quad: ErrorQuadric,
    /// Orientation quadric of the member normals, each weighted by its face
    /// area; `r_quad.c` equals `area`.
    pub r_quad: ErrorQuadric,
    /// Whether any member face touches the mesh border.
    pub has_border_edge: bool,
    /// Cleared once the chart has been absorbed; never set again.
    pub active: bool,
}

impl Chart {
    /// Seed a chart from a single face.
    ///
    /// The perimeter is the full triangle perimeter since no edge is internal yet.
    #[must_use]
    pub fn from_face(id: ChartId, face_id: FaceId, face: &Face) -> Self {
        Self {
            id,
            faces: vec![face_id],
            normals: vec![face.normal],
            areas: vec![face.area],
            area: face.area,
            perimeter: face.perimeter(),
            avg_normal: face.normal,
            p_quad: ErrorQuadric::from_face_points(face),
            r_quad: ErrorQuadric::from_normal(&face.normal) * face.area,
            has_border_edge: face.touches_border(),
            active: true,
        }
    }

    /// Number of member faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Absorb `other` into this chart.
    ///
    /// `shared_edge_length` is the summed length of the edges between a face
    /// of `self` and a face of `other`; each such edge was counted in both
    /// perimeters and is removed twice. `other` is left inactive and empty.
    pub fn merge_with(&mut self, other: &mut Self, shared_edge_length: f64) {
        self.perimeter = merged_perimeter(self.perimeter, other.perimeter, shared_edge_length);

        self.faces.append(&mut other.faces);
        self.normals.append(&mut other.normals);
        self.areas.append(&mut other.areas);

        self.p_quad += other.p_quad;
        self.r_quad += other.r_quad;
        self.area += other.area;

        self.avg_normal = self
            .normals
            .iter()
            .zip(&self.areas)
            .fold(Vector3::zeros(), |acc, (n, a)| acc + n * *a)
            .try_normalize(f64::MIN_POSITIVE)
            .unwrap_or_else(Vector3::zeros);

        self.has_border_edge |= other.has_border_edge;

        other.area = 0.0;
        other.perimeter = 0.0;
        other.active = false;
    }
}

/// Perimeter of the union of two charts sharing `shared_edge_length` of boundary.
#[must_use]
pub fn merged_perimeter(p1: f64, p2: f64, shared_edge_length: f64) -> f64 {
    shared_edge_length.mul_add(-2.0, p1 + p2)
}
