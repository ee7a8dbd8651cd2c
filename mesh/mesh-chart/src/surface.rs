//! Input surface topology.
//!
//! A [`SurfaceMesh`] is the immutable view of the triangulated surface that
//! clustering works on: per face, three corner positions, a unit normal, the
//! area and three neighbor slots. Edge `i` of a face runs from corner `i` to
//! corner `(i + 1) % 3`, and neighbor slot `i` holds the face across that
//! edge, or `None` on the mesh border.

// Face counts are bounded by u32 ids
#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Stable face identifier (index into [`SurfaceMesh::faces`]).
pub type FaceId = u32;

/// One triangle of the input surface.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Face {
    /// Corner positions, counter-clockwise.
    pub vertices: [Point3<f64>; 3],

    /// Face across edge `i`, or `None` for a border edge.
    pub neighbors: [Option<FaceId>; 3],

    /// Unit normal (zero for a collinear triangle).
    pub normal: Vector3<f64>,

    /// Triangle area.
    pub area: f64,
}

impl Face {
    /// Create a face from its corners, deriving normal and area.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_chart::Face;
    /// use nalgebra::Point3;
    ///
    /// let face = Face::from_corners(
    ///     [
    ///         Point3::new(0.0, 0.0, 0.0),
    ///         Point3::new(1.0, 0.0, 0.0),
    ///         Point3::new(0.0, 1.0, 0.0),
    ///     ],
    ///     [None, None, None],
    /// );
    /// assert!((face.area - 0.5).abs() < 1e-12);
    /// assert!((face.normal.z - 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_corners(vertices: [Point3<f64>; 3], neighbors: [Option<FaceId>; 3]) -> Self {
        let cross = (vertices[1] - vertices[0]).cross(&(vertices[2] - vertices[0]));
        let area = cross.norm() * 0.5;
        let normal = cross
            .try_normalize(f64::MIN_POSITIVE)
            .unwrap_or_else(Vector3::zeros);

        Self {
            vertices,
            neighbors,
            normal,
            area,
        }
    }

    /// Length of edge `i` (corner `i` to corner `i + 1`).
    #[must_use]
    pub fn edge_length(&self, edge: usize) -> f64 {
        let a = self.vertices[edge % 3];
        let b = self.vertices[(edge + 1) % 3];
        (b - a).norm()
    }

    /// Sum of the three edge lengths.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        (0..3).map(|edge| self.edge_length(edge)).sum()
    }

    /// Whether any edge lies on the mesh border.
    #[must_use]
    pub fn touches_border(&self) -> bool {
        self.neighbors.iter().any(Option::is_none)
    }

    /// Centroid of the three corners.
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.vertices[0].coords + self.vertices[1].coords + self.vertices[2].coords) / 3.0)
    }
}

/// An interior edge between two faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedEdge {
    /// Face on one side (the lower id).
    pub first: FaceId,
    /// Face on the other side.
    pub second: FaceId,
    /// Edge length.
    pub length: f64,
}

/// A triangulated surface with per-face adjacency.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceMesh {
    faces: Vec<Face>,
}

impl SurfaceMesh {
    /// Wrap pre-built faces after checking their adjacency.
    ///
    /// # Errors
    ///
    /// - [`ChartError::NeighborOutOfBounds`] if a neighbor slot points past the face list
    /// - [`ChartError::AsymmetricAdjacency`] if a face is its own neighbor or
    ///   the neighbor does not list it back
    pub fn from_faces(faces: Vec<Face>) -> ChartResult<Self> {
        let face_count = faces.len();

        for (idx, face) in faces.iter().enumerate() {
            let id = idx as FaceId;
            for neighbor in face.neighbors.iter().flatten().copied() {
                let Some(other) = faces.get(neighbor as usize) else {
                    return Err(ChartError::NeighborOutOfBounds {
                        face: id,
                        neighbor,
                        face_count,
                    });
                };
                if neighbor == id || !other.neighbors.contains(&Some(id)) {
                    return Err(ChartError::AsymmetricAdjacency { face: id, neighbor });
                }
            }
        }

        Ok(Self { faces })
    }

    /// Build a surface from positions and triangle indices.
    ///
    /// # Errors
    ///
    /// - [`ChartError::VertexOutOfBounds`] for an index past `positions`
    /// - [`ChartError::DegenerateFace`] for a triangle repeating a vertex
    /// - [`ChartError::NonManifoldEdge`] for an edge used by more than two faces
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_chart::SurfaceMesh;
    /// use nalgebra::Point3;
    ///
    /// let positions = [
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// ];
    /// let mesh = SurfaceMesh::from_triangles(&positions, &[[0, 1, 2], [0, 2, 3]]).unwrap();
    ///
    /// assert_eq!(mesh.face_count(), 2);
    /// assert_eq!(mesh.shared_edges().count(), 1);
    /// ```
    pub fn from_triangles(positions: &[Point3<f64>], triangles: &[[u32; 3]]) -> ChartResult<Self> {
        let vertex_count = positions.len();

        for (idx, tri) in triangles.iter().enumerate() {
            let face = idx as FaceId;
            if let Some(&vertex) = tri.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(ChartError::VertexOutOfBounds {
                    face,
                    vertex,
                    vertex_count,
                });
            }
            let distinct = distinct_corner_count(tri);
            if distinct < 3 {
                // Two distinct corners leave a single edge, one leaves none
                return Err(ChartError::DegenerateFace {
                    face,
                    edge_count: distinct.saturating_sub(1),
                });
            }
        }

        let mut edge_to_faces: HashMap<(u32, u32), Vec<(FaceId, usize)>> = HashMap::new();
        for (idx, tri) in triangles.iter().enumerate() {
            for edge in 0..3 {
                let key = normalize_edge(tri[edge], tri[(edge + 1) % 3]);
                edge_to_faces
                    .entry(key)
                    .or_default()
                    .push((idx as FaceId, edge));
            }
        }

        let mut neighbors = vec![[None; 3]; triangles.len()];
        for (&(v0, v1), users) in &edge_to_faces {
            match users.as_slice() {
                [_] => {}
                [(fa, ea), (fb, eb)] => {
                    neighbors[*fa as usize][*ea] = Some(*fb);
                    neighbors[*fb as usize][*eb] = Some(*fa);
                }
                _ => {
                    return Err(ChartError::NonManifoldEdge {
                        v0,
                        v1,
                        face_count: users.len(),
                    });
                }
            }
        }

        let faces = triangles
            .iter()
            .zip(neighbors)
            .map(|(tri, adjacent)| {
                Face::from_corners(
                    [
                        positions[tri[0] as usize],
                        positions[tri[1] as usize],
                        positions[tri[2] as usize],
                    ],
                    adjacent,
                )
            })
            .collect();

        Ok(Self { faces })
    }

    /// Build a surface from polygon index lists, requiring every polygon to be a triangle.
    ///
    /// # Errors
    ///
    /// - [`ChartError::DegenerateFace`] for a polygon with fewer than three corners
    /// - [`ChartError::NotTriangulated`] for a polygon with more than three corners
    /// - everything [`SurfaceMesh::from_triangles`] reports
    pub fn from_polygons(positions: &[Point3<f64>], polygons: &[Vec<u32>]) -> ChartResult<Self> {
        let triangles = polygons
            .iter()
            .enumerate()
            .map(|(idx, polygon)| match polygon.as_slice() {
                &[a, b, c] => Ok([a, b, c]),
                short if short.len() < 3 => Err(ChartError::DegenerateFace {
                    face: idx as FaceId,
                    edge_count: short.len().saturating_sub(1),
                }),
                long => Err(ChartError::NotTriangulated {
                    face: idx as FaceId,
                    vertex_count: long.len(),
                }),
            })
            .collect::<ChartResult<Vec<_>>>()?;

        Self::from_triangles(positions, &triangles)
    }

    /// All faces, indexed by [`FaceId`].
    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Get one face.
    #[must_use]
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id as usize)
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the surface has no faces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Total surface area.
    #[must_use]
    pub fn total_area(&self) -> f64 {
        self.faces.iter().map(|f| f.area).sum()
    }

    /// Iterate over interior edges, each reported once from the lower face id.
    pub fn shared_edges(&self) -> impl Iterator<Item = SharedEdge> + '_ {
        self.faces.iter().enumerate().flat_map(|(idx, face)| {
            let first = idx as FaceId;
            face.neighbors
                .iter()
                .enumerate()
                .filter_map(move |(edge, neighbor)| match *neighbor {
                    Some(second) if second > first => Some(SharedEdge {
                        first,
                        second,
                        length: face.edge_length(edge),
                    }),
                    _ => None,
                })
        })
    }
}

const fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}

fn distinct_corner_count(tri: &[u32; 3]) -> usize {
    match (tri[0] == tri[1], tri[1] == tri[2], tri[0] == tri[2]) {
        (false, false, false) => 3,
        (true, true, _) => 1,
        _ => 2,
    }
}
