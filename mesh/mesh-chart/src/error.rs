//! Error types for chart clustering.

use thiserror::Error;

/// Result type for chart clustering operations.
pub type ChartResult<T> = Result<T, ChartError>;

/// Errors that can occur while building the input surface or clustering it.
///
/// All of these abort the run. Halting early because the join queue ran dry
/// or the cost threshold was reached is not an error; it is reported through
/// [`HaltReason`](crate::HaltReason).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChartError {
    /// Mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face has fewer than three distinct edges.
    #[error("face {face} is degenerate: {edge_count} distinct edges (need 3)")]
    DegenerateFace {
        /// The offending face.
        face: u32,
        /// Number of distinct edges the face actually has.
        edge_count: usize,
    },

    /// A polygon has more than three corners.
    #[error("face {face} is not a triangle: {vertex_count} corners")]
    NotTriangulated {
        /// The offending face.
        face: u32,
        /// Number of corners of the polygon.
        vertex_count: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {vertex} (mesh has {vertex_count} vertices)")]
    VertexOutOfBounds {
        /// The offending face.
        face: u32,
        /// The invalid vertex index.
        vertex: u32,
        /// Total number of vertices.
        vertex_count: usize,
    },

    /// A face references a neighbor face that does not exist.
    #[error("face {face} references neighbor {neighbor} (mesh has {face_count} faces)")]
    NeighborOutOfBounds {
        /// The offending face.
        face: u32,
        /// The invalid neighbor index.
        neighbor: u32,
        /// Total number of faces.
        face_count: usize,
    },

    /// Face adjacency is not symmetric.
    #[error("face {face} lists {neighbor} as neighbor but not the other way round")]
    AsymmetricAdjacency {
        /// The face holding the one-sided reference.
        face: u32,
        /// The referenced face.
        neighbor: u32,
    },

    /// An edge is shared by more than two faces.
    #[error("edge ({v0}, {v1}) is shared by {face_count} faces")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: u32,
        /// Second vertex of the edge.
        v1: u32,
        /// Number of faces using the edge.
        face_count: usize,
    },

    /// A partition does not label every face exactly once.
    #[error("partition has {actual} labels but mesh has {expected} faces")]
    PartitionSizeMismatch {
        /// Number of faces in the mesh.
        expected: usize,
        /// Number of labels supplied.
        actual: usize,
    },

    /// A parameter is out of its valid range.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
}
