//! Best-fit plane extraction from a point quadric.
//!
//! The least-squares plane through the points a quadric represents has as
//! normal the eigenvector of the covariance `Z = A - bbᵀ/c` with the smallest
//! eigenvalue (the direction of least spread), and offset `d = -(n·b)/c`.

use nalgebra::{Matrix3, SymmetricEigen, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::quadric::ErrorQuadric;

/// Iteration bound for the symmetric eigen-solver.
pub const MAX_EIGEN_ITERATIONS: usize = 50;

/// A plane `normal·x + offset = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plane {
    /// Unit normal.
    pub normal: Vector3<f64>,
    /// Signed offset.
    pub offset: f64,
}

impl Plane {
    /// Signed distance from a point to the plane.
    #[must_use]
    pub fn signed_distance(&self, point: &Vector3<f64>) -> f64 {
        self.normal.dot(point) + self.offset
    }

    /// Return the same plane with its normal on the side of `reference`.
    ///
    /// The plane is flipped when the angle between its normal and
    /// `reference` exceeds 90°. A zero reference leaves it unchanged.
    #[must_use]
    pub fn oriented_towards(self, reference: &Vector3<f64>) -> Self {
        if self.normal.dot(reference) < 0.0 {
            Self {
                normal: -self.normal,
                offset: -self.offset,
            }
        } else {
            self
        }
    }
}

/// Fit the least-squares plane to the points represented by `quadric`.
///
/// Returns `None` if the quadric has no weight or the eigen-solver does not
/// converge within [`MAX_EIGEN_ITERATIONS`].
///
/// # Example
///
/// ```
/// use mesh_chart::{fit_plane, ErrorQuadric};
/// use nalgebra::Point3;
///
/// let quadric: ErrorQuadric = [
///     Point3::new(0.0, 0.0, 2.0),
///     Point3::new(1.0, 0.0, 2.0),
///     Point3::new(0.0, 1.0, 2.0),
///     Point3::new(1.0, 1.0, 2.0),
/// ]
/// .iter()
/// .map(ErrorQuadric::from_point)
/// .sum();
///
/// let plane = fit_plane(&quadric).unwrap();
/// assert!((plane.normal.z.abs() - 1.0).abs() < 1e-9);
/// assert!(quadric.evaluate(&plane.normal, plane.offset).abs() < 1e-9);
/// ```
#[must_use]
pub fn fit_plane(quadric: &ErrorQuadric) -> Option<Plane> {
    let covariance = quadric.covariance()?;
    let normal = min_eigenvector(&covariance)?;
    let offset = -normal.dot(&quadric.b) / quadric.c;
    Some(Plane { normal, offset })
}

/// Unit eigenvector of a symmetric matrix for its smallest eigenvalue.
#[must_use]
pub fn min_eigenvector(matrix: &Matrix3<f64>) -> Option<Vector3<f64>> {
    if !matrix.iter().all(|v| v.is_finite()) {
        return None;
    }

    let eigen = SymmetricEigen::try_new(*matrix, f64::EPSILON, MAX_EIGEN_ITERATIONS)?;
    let min_idx = eigen.eigenvalues.imin();
    let column = eigen.eigenvectors.column(min_idx);

    Vector3::new(column[0], column[1], column[2]).try_normalize(f64::MIN_POSITIVE)
}
