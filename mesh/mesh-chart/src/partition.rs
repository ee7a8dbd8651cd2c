//! Coarse face partitions used to seed clustering.

// Grid indices are small and non-negative after clamping
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::debug;

use crate::error::{ChartError, ChartResult};
use crate::surface::SurfaceMesh;

/// Label faces by the cell of a uniform cubic grid holding their centroid.
///
/// The longest side of the centroids' bounding box is split into
/// `resolution` cells; the other axes use the same cell size. Labels are
/// dense and numbered in order of first appearance.
///
/// # Errors
///
/// Returns [`ChartError::InvalidParameter`] if `resolution` is zero.
///
/// # Example
///
/// ```
/// use mesh_chart::{grid_partition, SurfaceMesh};
/// use nalgebra::Point3;
///
/// let positions = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(4.0, 0.0, 0.0),
///     Point3::new(4.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh = SurfaceMesh::from_triangles(&positions, &[[0, 1, 2], [0, 2, 3]]).unwrap();
///
/// let labels = grid_partition(&mesh, 1).unwrap();
/// assert_eq!(labels, vec![0, 0]);
/// ```
pub fn grid_partition(mesh: &SurfaceMesh, resolution: u32) -> ChartResult<Vec<u32>> {
    if resolution == 0 {
        return Err(ChartError::InvalidParameter {
            name: "resolution",
            value: 0.0,
        });
    }

    let centroids: Vec<Point3<f64>> = mesh.faces().iter().map(|f| f.centroid()).collect();
    let Some(first) = centroids.first() else {
        return Ok(Vec::new());
    };

    let (min, max) = centroids
        .iter()
        .fold((*first, *first), |(lo, hi), c| (lo.inf(c), hi.sup(c)));
    let extent = (max - min).max();
    let cell_size = extent / f64::from(resolution);

    let cell_of = |c: &Point3<f64>| -> [u32; 3] {
        if cell_size <= 0.0 || !cell_size.is_finite() {
            return [0; 3];
        }
        let offset = c - min;
        [offset.x, offset.y, offset.z].map(|v| ((v / cell_size).floor() as u32).min(resolution - 1))
    };

    let mut cells: HashMap<[u32; 3], u32> = HashMap::new();
    let labels: Vec<u32> = centroids
        .iter()
        .map(|c| {
            let next = cells.len() as u32;
            *cells.entry(cell_of(c)).or_insert(next)
        })
        .collect();

    debug!(
        faces = labels.len(),
        cells = cells.len(),
        resolution,
        "Grid partition built"
    );

    Ok(labels)
}
