//! Chart clustering entry points.

// Chart counts are bounded by u32 ids
#![allow(clippy::cast_possible_truncation)]

use tracing::debug;

use crate::atlas::ChartSet;
use crate::error::{ChartError, ChartResult};
use crate::params::ChartParams;
use crate::result::{ChartMap, ChartSummary, ChartingResult};
use crate::scheduler::JoinScheduler;
use crate::surface::SurfaceMesh;

/// Segment a mesh into quasi-planar charts, starting from one chart per face.
///
/// Adjacent charts are merged greedily in order of increasing join cost
/// until the queue runs dry, the cheapest join reaches
/// `params.cost_threshold`, the active chart count drops to
/// `params.chart_threshold`, or `params.max_merges` merges were made.
///
/// # Errors
///
/// - [`ChartError::EmptyMesh`] if the mesh has no faces
/// - [`ChartError::InvalidParameter`] if the parameters are invalid
///
/// # Example
///
/// ```
/// use mesh_chart::{create_charts, ChartParams, SurfaceMesh};
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
/// let result = create_charts(&mesh, &ChartParams::with_target_charts(1)).unwrap();
/// assert_eq!(result.chart_count(), 1);
/// println!("{result}");
/// ```
pub fn create_charts(mesh: &SurfaceMesh, params: &ChartParams) -> ChartResult<ChartingResult> {
    check_inputs(mesh, params)?;
    cluster(ChartSet::from_surface(mesh), params)
}

/// Segment a mesh starting from an existing face labelling.
///
/// Adjacent faces with equal labels are joined before any cost is
/// evaluated, so every seed chart is one connected patch of its label;
/// disconnected faces sharing a label become separate seeds. Greedy
/// merging then proceeds as in [`create_charts`].
///
/// # Errors
///
/// - [`ChartError::EmptyMesh`] if the mesh has no faces
/// - [`ChartError::PartitionSizeMismatch`] if `labels` does not have one entry per face
/// - [`ChartError::InvalidParameter`] if the parameters are invalid
pub fn create_charts_from_partition(
    mesh: &SurfaceMesh,
    labels: &[u32],
    params: &ChartParams,
) -> ChartResult<ChartingResult> {
    check_inputs(mesh, params)?;
    if labels.len() != mesh.face_count() {
        return Err(ChartError::PartitionSizeMismatch {
            expected: mesh.face_count(),
            actual: labels.len(),
        });
    }

    let mut charts = ChartSet::from_surface(mesh);
    for edge in mesh.shared_edges() {
        if labels[edge.first as usize] != labels[edge.second as usize] {
            continue;
        }
        if let (Some(a), Some(b)) = (
            charts.chart_of_face(edge.first),
            charts.chart_of_face(edge.second),
        ) {
            if a != b {
                charts.merge(a, b);
            }
        }
    }

    debug!(
        faces = mesh.face_count(),
        seeds = charts.active_count(),
        "Seeded charts from partition"
    );

    cluster(charts, params)
}

fn check_inputs(mesh: &SurfaceMesh, params: &ChartParams) -> ChartResult<()> {
    params.validate()?;
    if mesh.is_empty() {
        return Err(ChartError::EmptyMesh);
    }
    Ok(())
}

fn cluster(charts: ChartSet, params: &ChartParams) -> ChartResult<ChartingResult> {
    let (charts, stats) = JoinScheduler::new(charts, params)?.run();

    let map = ChartMap::from_chart_set(&charts);
    let summaries = charts
        .active()
        .enumerate()
        .map(|(idx, chart)| ChartSummary::new(idx as u32, chart))
        .collect();

    Ok(ChartingResult {
        map,
        charts: summaries,
        stats,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::scheduler::HaltReason;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    /// Two unit squares side by side, folded 90° along their shared edge.
    fn folded_squares() -> SurfaceMesh {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
        ];
        let triangles = [[0, 1, 2], [0, 2, 3], [1, 4, 5], [1, 5, 2]];
        SurfaceMesh::from_triangles(&positions, &triangles).unwrap()
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let mesh = SurfaceMesh::from_triangles(&[], &[]).unwrap();
        let err = create_charts(&mesh, &ChartParams::default()).unwrap_err();
        assert_eq!(err, ChartError::EmptyMesh);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = ChartParams::default().with_cost_threshold(f64::NAN);
        let err = create_charts(&folded_squares(), &params).unwrap_err();
        assert!(matches!(err, ChartError::InvalidParameter { .. }));
    }

    #[test]
    fn test_folded_squares_split_along_fold() {
        let mesh = folded_squares();
        let params = ChartParams::planar().with_chart_threshold(2);
        let result = create_charts(&mesh, &params).unwrap();

        assert_eq!(result.chart_count(), 2);
        let map = &result.map;
        assert_eq!(map.chart_of(0), map.chart_of(1));
        assert_eq!(map.chart_of(2), map.chart_of(3));
        assert_ne!(map.chart_of(0), map.chart_of(2));

        for summary in &result.charts {
            assert_eq!(summary.face_count, 2);
            assert_relative_eq!(summary.area, 1.0, epsilon = 1e-12);
            assert_relative_eq!(summary.perimeter, 4.0, epsilon = 1e-12);
            assert!(summary.has_border_edge);
        }
    }

    #[test]
    fn test_compaction_is_dense_in_storage_order() {
        let params = ChartParams::planar().with_chart_threshold(2);
        let result = create_charts(&folded_squares(), &params).unwrap();
        assert_eq!(result.map.face_charts(), &[0, 0, 1, 1]);
        assert_eq!(result.charts[0].id, 0);
        assert_eq!(result.charts[1].id, 1);
    }

    #[test]
    fn test_partition_seeds_are_merged_first() {
        let mesh = folded_squares();
        let labels = [7, 7, 3, 3];
        let params = ChartParams::default().with_chart_threshold(2);
        let result = create_charts_from_partition(&mesh, &labels, &params).unwrap();

        assert_eq!(result.stats.initial_charts, 2);
        assert_eq!(result.stats.merges, 0);
        assert_eq!(result.stats.halt_reason, HaltReason::ChartThreshold);
        assert_eq!(result.map.face_charts(), &[0, 0, 1, 1]);
    }

    #[test]
    fn test_disconnected_label_gives_separate_seeds() {
        let mesh = folded_squares();
        // Faces 1 and 2 share a label but are not adjacent
        let labels = [0, 1, 1, 2];
        let params = ChartParams::default().with_chart_threshold(4);
        let result = create_charts_from_partition(&mesh, &labels, &params).unwrap();

        assert_eq!(result.stats.initial_charts, 4);
        assert_eq!(result.chart_count(), 4);
        assert_ne!(result.map.chart_of(1), result.map.chart_of(2));
    }

    #[test]
    fn test_partition_size_mismatch() {
        let err = create_charts_from_partition(&folded_squares(), &[0, 0], &ChartParams::default())
            .unwrap_err();
        assert_eq!(
            err,
            ChartError::PartitionSizeMismatch {
                expected: 4,
                actual: 2
            }
        );
    }
}
