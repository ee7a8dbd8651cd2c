//! Mesh segmentation into quasi-planar charts.
//!
//! This crate partitions a triangulated surface into charts: connected
//! clusters of faces that are nearly planar, consistently oriented and
//! compact. Charts are grown greedily by merging the adjacent pair with the
//! lowest join cost, with costs evaluated in O(1) from error quadrics.
//!
//! # Features
//!
//! - **Error quadrics**: Point-fit and orientation quadrics summed per chart
//! - **Plane fitting**: Least-squares plane from a quadric's covariance
//! - **Weighted cost**: Planarity, orientation and compactness terms
//! - **Greedy scheduling**: Cost-ordered join queue repaired after every merge
//! - **Seeding**: Start from single faces, a face labelling or a grid partition
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//! - Other game engines
//!
//! # Example
//!
//! ```
//! use mesh_chart::{create_charts, ChartParams, CostWeights, SurfaceMesh};
//! use nalgebra::Point3;
//!
//! // A unit square folded into an L along x = 1
//! let positions = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(1.0, 0.0, 1.0),
//!     Point3::new(1.0, 1.0, 1.0),
//! ];
//! let triangles = [[0, 1, 2], [0, 2, 3], [1, 4, 5], [1, 5, 2]];
//! let mesh = SurfaceMesh::from_triangles(&positions, &triangles).unwrap();
//!
//! let params = ChartParams::with_target_charts(2).with_weights(CostWeights::planar());
//! let result = create_charts(&mesh, &params).unwrap();
//! assert_eq!(result.chart_count(), 2);
//! println!("{}", result);
//! ```
//!
//! # Algorithm
//!
//! 1. Seed one chart per face with its point and orientation quadrics
//! 2. Queue one join per pair of adjacent charts, costed as
//!    `w_fit·E_fit + w_ori·E_dir + w_shape·E_shape`
//! 3. Repeatedly merge the cheapest pair; drop the absorbed chart's joins and
//!    re-cost every join of the survivor
//! 4. Stop when the queue is empty, the cheapest join reaches the cost
//!    threshold, the chart threshold is reached or the merge cap is hit
//! 5. Number the remaining charts densely in storage order

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod atlas;
mod chart;
mod cluster;
mod cost;
mod error;
mod join;
mod params;
mod partition;
mod plane;
mod quadric;
mod result;
mod scheduler;
mod surface;

// Re-export main types and functions
pub use atlas::{ChartSet, MergeOutcome};
pub use chart::{Chart, ChartId, merged_perimeter};
pub use cluster::{create_charts, create_charts_from_partition};
pub use cost::{cost_of_join, direction_error, fit_error, irregularity, shape_penalty};
pub use error::{ChartError, ChartResult};
pub use join::{JoinOperation, JoinQueue};
pub use params::{ChartParams, CostWeights};
pub use partition::grid_partition;
pub use plane::{MAX_EIGEN_ITERATIONS, Plane, fit_plane, min_eigenvector};
pub use quadric::ErrorQuadric;
pub use result::{ChartMap, ChartSummary, ChartingResult, ClusterStats};
pub use scheduler::{HaltReason, JoinScheduler};
pub use surface::{Face, FaceId, SharedEdge, SurfaceMesh};
