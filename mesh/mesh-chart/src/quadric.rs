//! Error quadrics for chart fitting.
//!
//! An [`ErrorQuadric`] is the triple `(A, b, c)` with `A` a symmetric 3x3
//! matrix, `b` a vector and `c` a scalar. Evaluated at a plane `(n, d)` it
//! gives `nᵀAn + 2d·bᵀn + c·d²`. Seeded from points it measures summed squared
//! point-to-plane distance; seeded from normals (with `d = 1`) it measures
//! summed `(1 - n·nᵢ)²` normal deviation. Both kinds are summable, so a chart
//! keeps one quadric per metric instead of its point set.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use nalgebra::{Matrix3, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::surface::Face;

/// Quadric error accumulator.
///
/// The zero value (from [`Default`]) is only the identity for summation;
/// every quadric seeded from data has `c > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ErrorQuadric {
    /// Symmetric second-moment term.
    pub a: Matrix3<f64>,
    /// First-moment term.
    pub b: Vector3<f64>,
    /// Sample weight.
    pub c: f64,
}

impl Default for ErrorQuadric {
    fn default() -> Self {
        Self {
            a: Matrix3::zeros(),
            b: Vector3::zeros(),
            c: 0.0,
        }
    }
}

impl ErrorQuadric {
    /// Point-fit quadric of a single point: `A = ppᵀ`, `b = p`, `c = 1`.
    #[must_use]
    pub fn from_point(p: &Point3<f64>) -> Self {
        Self {
            a: p.coords * p.coords.transpose(),
            b: p.coords,
            c: 1.0,
        }
    }

    /// Orientation quadric of a unit normal: `A = nnᵀ`, `b = -n`, `c = 1`.
    #[must_use]
    pub fn from_normal(n: &Vector3<f64>) -> Self {
        Self {
            a: n * n.transpose(),
            b: -n,
            c: 1.0,
        }
    }

    /// Point-fit quadric of a face: the sum of its three corner quadrics.
    ///
    /// Corners are not shared between faces, so a vertex used by `k` faces
    /// contributes `k` times once those faces are clustered together.
    #[must_use]
    pub fn from_face_points(face: &Face) -> Self {
        face.vertices.iter().map(Self::from_point).sum()
    }

    /// Scale all three terms by `weight`.
    #[must_use]
    pub fn scaled(&self, weight: f64) -> Self {
        Self {
            a: self.a * weight,
            b: self.b * weight,
            c: self.c * weight,
        }
    }

    /// Covariance `Z = A - bbᵀ/c`.
    ///
    /// Returns `None` when `c` is too small to divide by.
    #[must_use]
    pub fn covariance(&self) -> Option<Matrix3<f64>> {
        if self.is_degenerate() {
            return None;
        }
        Some(self.a - (self.b * self.b.transpose()) / self.c)
    }

    /// Evaluate the quadratic form at plane `(normal, offset)`.
    ///
    /// For a point quadric this is the summed squared distance of all
    /// represented points to the plane `n·x + d = 0`.
    #[must_use]
    pub fn evaluate(&self, normal: &Vector3<f64>, offset: f64) -> f64 {
        let quadratic = normal.dot(&(self.a * normal));
        let linear = 2.0 * offset * self.b.dot(normal);
        offset.mul_add(self.c * offset, quadratic + linear)
    }

    /// Evaluate an orientation quadric against a direction.
    ///
    /// Equals `Σ wᵢ (1 - n·nᵢ)²` over the represented normals.
    #[must_use]
    pub fn evaluate_direction(&self, normal: &Vector3<f64>) -> f64 {
        self.evaluate(normal, 1.0)
    }

    /// Whether the weight `c` is zero, negative or not finite.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.c.is_finite() && self.c > f64::MIN_POSITIVE)
    }
}

impl Add for ErrorQuadric {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            a: self.a + rhs.a,
            b: self.b + rhs.b,
            c: self.c + rhs.c,
        }
    }
}

impl AddAssign for ErrorQuadric {
    fn add_assign(&mut self, rhs: Self) {
        self.a += rhs.a;
        self.b += rhs.b;
        self.c += rhs.c;
    }
}

impl Mul<f64> for ErrorQuadric {
    type Output = Self;

    fn mul(self, weight: f64) -> Self {
        self.scaled(weight)
    }
}

impl Sum for ErrorQuadric {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
