//! Join cost: planarity, orientation and compactness of a candidate merge.
//!
//! All three terms are dimensionless and evaluated on the union of two
//! charts without performing the merge.

// Face counts are far below 2^52
#![allow(clippy::cast_precision_loss)]

use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::chart::{Chart, merged_perimeter};
use crate::params::CostWeights;
use crate::plane::{Plane, fit_plane};

/// Isoperimetric irregularity `P² / (4πA)`.
///
/// Equals 1 for a disc and grows for elongated or ragged shapes.
///
/// # Example
///
/// ```
/// use mesh_chart::irregularity;
/// use std::f64::consts::PI;
///
/// let r = 2.0;
/// assert!((irregularity(2.0 * PI * r, PI * r * r) - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn irregularity(perimeter: f64, area: f64) -> f64 {
    (perimeter * perimeter) / (4.0 * PI * area)
}

/// Mean squared distance of the union's points to its best-fit plane.
///
/// Returns the error together with the fit plane, oriented along the
/// area-weighted mean of both charts' average normals. `None` when the plane
/// cannot be fitted.
#[must_use]
pub fn fit_error(c1: &Chart, c2: &Chart) -> Option<(f64, Plane)> {
    let quadric = c1.p_quad + c2.p_quad;
    let plane = fit_plane(&quadric)?;

    let points = 3 * (c1.face_count() + c2.face_count());
    let error = quadric.evaluate(&plane.normal, plane.offset) / points as f64;

    let reference: Vector3<f64> = c1.avg_normal * c1.area + c2.avg_normal * c2.area;
    Some((error, plane.oriented_towards(&reference)))
}

/// Area-normalized deviation of the union's face normals from `normal`.
///
/// `None` when the combined orientation quadric carries no weight.
#[must_use]
pub fn direction_error(c1: &Chart, c2: &Chart, normal: &Vector3<f64>) -> Option<f64> {
    let quadric = c1.r_quad + c2.r_quad;
    let area = c1.area + c2.area;
    if quadric.is_degenerate() || area <= 0.0 {
        return None;
    }
    Some(quadric.evaluate_direction(normal) / area)
}

/// Relative change in irregularity caused by the merge.
///
/// `(irr(union) - max(irr(c1), irr(c2))) / irr(union)`; negative when the
/// union is more compact than the rougher of its parts.
#[must_use]
pub fn shape_penalty(c1: &Chart, c2: &Chart, shared_edge_length: f64) -> f64 {
    let irr1 = irregularity(c1.perimeter, c1.area);
    let irr2 = irregularity(c2.perimeter, c2.area);
    let perimeter = merged_perimeter(c1.perimeter, c2.perimeter, shared_edge_length);
    let irr_new = irregularity(perimeter, c1.area + c2.area);

    (irr_new - irr1.max(irr2)) / irr_new
}

/// Weighted cost of merging `c1` and `c2`.
///
/// Returns `None` when any term is numerically undefined (no plane fit,
/// zero area, non-finite result); callers treat such joins as never
/// worth performing.
#[must_use]
pub fn cost_of_join(
    c1: &Chart,
    c2: &Chart,
    shared_edge_length: f64,
    weights: &CostWeights,
) -> Option<f64> {
    let (e_fit, plane) = fit_error(c1, c2)?;
    let e_dir = direction_error(c1, c2, &plane.normal)?;
    let e_shape = if weights.shape == 0.0 {
        0.0
    } else {
        shape_penalty(c1, c2, shared_edge_length)
    };

    let cost = weights.shape.mul_add(
        e_shape,
        weights.fit.mul_add(e_fit, weights.orientation * e_dir),
    );
    cost.is_finite().then_some(cost)
}
