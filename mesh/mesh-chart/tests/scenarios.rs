//! End-to-end clustering scenarios.
//!
//! Run with: cargo test -p mesh-chart --test scenarios

#![allow(clippy::unwrap_used, clippy::expect_used)]

use approx::assert_relative_eq;
use mesh_chart::{
    ChartError, ChartParams, ChartSet, ChartingResult, CostWeights, ErrorQuadric, HaltReason,
    SurfaceMesh, create_charts, create_charts_from_partition, grid_partition, irregularity,
};
use nalgebra::Point3;

// =============================================================================
// Test Meshes
// =============================================================================

/// Unit square split along its diagonal.
fn unit_square() -> SurfaceMesh {
    let positions = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    SurfaceMesh::from_triangles(&positions, &[[0, 1, 2], [0, 2, 3]]).unwrap()
}

/// `n` x `n` unit quads, two right triangles each, with height `z(x, y)`.
fn grid(n: u32, z: impl Fn(f64, f64) -> f64) -> SurfaceMesh {
    scaled_grid(n, 1.0, z)
}

/// Same as [`grid`] with every coordinate multiplied by `scale`.
fn scaled_grid(n: u32, scale: f64, z: impl Fn(f64, f64) -> f64) -> SurfaceMesh {
    let mut positions = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            let (x, y) = (f64::from(i), f64::from(j));
            positions.push(Point3::new(x, y, z(x, y)) * scale);
        }
    }
    let idx = |i: u32, j: u32| j * (n + 1) + i;
    let mut triangles = Vec::new();
    for j in 0..n {
        for i in 0..n {
            triangles.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
            triangles.push([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
        }
    }
    SurfaceMesh::from_triangles(&positions, &triangles).unwrap()
}

/// Open square pyramid: four side faces, no two coplanar.
fn pyramid() -> SurfaceMesh {
    let positions = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(2.0, 2.0, 0.0),
        Point3::new(0.0, 2.0, 0.0),
        Point3::new(1.0, 1.0, 1.0),
    ];
    let triangles = [[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]];
    SurfaceMesh::from_triangles(&positions, &triangles).unwrap()
}

/// Boundary length of every chart, recomputed from the face map.
fn recomputed_perimeters(mesh: &SurfaceMesh, result: &ChartingResult) -> Vec<f64> {
    let mut perimeters = vec![0.0; result.chart_count()];
    for (id, face) in mesh.faces().iter().enumerate() {
        let chart = result.map.chart_of(id as u32).unwrap();
        for (edge, neighbor) in face.neighbors.iter().enumerate() {
            let internal = neighbor.is_some_and(|n| result.map.chart_of(n) == Some(chart));
            if !internal {
                perimeters[chart as usize] += face.edge_length(edge);
            }
        }
    }
    perimeters
}

// =============================================================================
// Reference Scenarios
// =============================================================================

#[test]
fn coplanar_square_merges_into_one_chart() {
    let mesh = unit_square();
    let params = ChartParams::default().with_chart_threshold(1);
    let result = create_charts(&mesh, &params).unwrap();

    assert_eq!(result.chart_count(), 1);
    assert_eq!(result.stats.merges, 1);
    assert_eq!(result.map.face_charts(), &[0, 0]);

    let chart = &result.charts[0];
    assert_relative_eq!(chart.perimeter, 4.0, epsilon = 1e-12);
    assert_relative_eq!(chart.area, 1.0, epsilon = 1e-12);
    assert_relative_eq!(chart.irregularity, irregularity(4.0, 1.0), epsilon = 1e-12);
    assert_relative_eq!(chart.avg_normal.z, 1.0, epsilon = 1e-12);
}

#[test]
fn threshold_at_face_count_keeps_identity_map() {
    let mesh = grid(2, |x, y| 0.3 * x * y);
    let params = ChartParams::default().with_chart_threshold(mesh.face_count());
    let result = create_charts(&mesh, &params).unwrap();

    assert_eq!(result.stats.merges, 0);
    assert!(!result.was_clustered());
    assert_eq!(result.stats.halt_reason, HaltReason::ChartThreshold);
    let identity: Vec<u32> = (0..mesh.face_count() as u32).collect();
    assert_eq!(result.map.face_charts(), identity.as_slice());
}

#[test]
fn zero_cost_threshold_blocks_positive_cost_joins() {
    let mesh = pyramid();
    let params = ChartParams::planar()
        .with_chart_threshold(0)
        .with_cost_threshold(0.0);
    let result = create_charts(&mesh, &params).unwrap();

    assert_eq!(result.stats.merges, 0);
    assert_eq!(result.chart_count(), 4);
    assert_eq!(result.stats.halt_reason, HaltReason::CostThreshold);
}

#[test]
fn flat_grid_converges_to_one_chart() {
    let mesh = grid(2, |_, _| 0.0);
    assert_eq!(mesh.face_count(), 8);

    let params = ChartParams::default()
        .with_weights(CostWeights::new(1.0, 1.0, 0.0))
        .with_chart_threshold(1);
    let result = create_charts(&mesh, &params).unwrap();

    assert_eq!(result.chart_count(), 1);
    assert_eq!(result.stats.merges, 7);
    assert_relative_eq!(result.charts[0].perimeter, 8.0, epsilon = 1e-9);
    assert_relative_eq!(result.charts[0].area, 4.0, epsilon = 1e-9);
}

#[test]
fn large_flat_grid_converges_at_any_scale() {
    for scale in [1e-3, 1.0, 10.0, 100.0] {
        let mesh = scaled_grid(12, scale, |_, _| 0.0);
        assert_eq!(mesh.face_count(), 288);

        let params = ChartParams::planar().with_chart_threshold(1);
        let result = create_charts(&mesh, &params).unwrap();

        assert_eq!(result.chart_count(), 1, "scale {scale}");
        assert_eq!(result.stats.merges, 287, "scale {scale}");
        assert_eq!(result.stats.degenerate_joins, 0, "scale {scale}");
        // One chart left means no joins left
        assert_eq!(result.stats.halt_reason, HaltReason::QueueEmpty, "scale {scale}");
        assert_relative_eq!(
            result.charts[0].area,
            144.0 * scale * scale,
            max_relative = 1e-9
        );
    }
}

#[test]
fn large_flat_grid_stops_at_chart_threshold() {
    for scale in [1e-3, 1.0, 100.0] {
        let mesh = scaled_grid(12, scale, |_, _| 0.0);
        let params = ChartParams::planar().with_chart_threshold(3);
        let result = create_charts(&mesh, &params).unwrap();

        assert_eq!(result.chart_count(), 3, "scale {scale}");
        assert_eq!(result.stats.degenerate_joins, 0, "scale {scale}");
        assert_eq!(result.stats.halt_reason, HaltReason::ChartThreshold, "scale {scale}");
    }
}

// =============================================================================
// Invariants
// =============================================================================

#[test]
fn face_count_is_conserved() {
    let mesh = grid(5, |x, y| (0.7 * x).sin() + (0.4 * y).cos());
    for threshold in [1, 3, 10, 25, 50] {
        let params = ChartParams::with_target_charts(threshold);
        let result = create_charts(&mesh, &params).unwrap();

        let total: usize = result.charts.iter().map(|c| c.face_count).sum();
        assert_eq!(total, mesh.face_count());
        assert_eq!(result.map.chart_sizes().iter().sum::<usize>(), mesh.face_count());
        assert_eq!(result.chart_count(), result.stats.final_charts);
        assert!(result.chart_count() >= threshold);
    }
}

#[test]
fn perimeters_match_boundary_length() {
    let mesh = grid(4, |x, y| 0.2 * (x - y).abs());
    let result = create_charts(&mesh, &ChartParams::with_target_charts(5)).unwrap();

    for (summary, expected) in result.charts.iter().zip(recomputed_perimeters(&mesh, &result)) {
        assert_relative_eq!(summary.perimeter, expected, epsilon = 1e-9);
    }
}

#[test]
fn single_face_chart_perimeter_is_edge_sum() {
    let mesh = unit_square();
    let charts = ChartSet::from_surface(&mesh);
    for (chart, face) in charts.charts().iter().zip(mesh.faces()) {
        let edges: f64 = (0..3).map(|e| face.edge_length(e)).sum();
        assert_relative_eq!(chart.perimeter, edges, epsilon = 1e-15);
    }
}

#[test]
fn merged_point_quadric_matches_direct_sum() {
    let mesh = grid(3, |x, y| 0.1 * x * x - 0.05 * y);
    let result = create_charts(&mesh, &ChartParams::with_target_charts(2)).unwrap();

    let mut charts = ChartSet::from_surface(&mesh);
    for chart in 0..result.chart_count() as u32 {
        let faces = result.map.faces_of(chart);
        for pair in faces.windows(2) {
            let a = charts.chart_of_face(pair[0]).unwrap();
            let b = charts.chart_of_face(pair[1]).unwrap();
            if a != b {
                charts.merge(a, b);
            }
        }
    }

    for chart in charts.active() {
        let direct: ErrorQuadric = chart
            .faces
            .iter()
            .map(|&f| ErrorQuadric::from_face_points(mesh.face(f).unwrap()))
            .sum();
        assert_relative_eq!((chart.p_quad.a - direct.a).norm(), 0.0, epsilon = 1e-9);
        assert_relative_eq!((chart.p_quad.b - direct.b).norm(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(chart.p_quad.c, direct.c, epsilon = 1e-12);
    }
}

#[test]
fn fold_separates_charts() {
    // Flat for x <= 2, rising at 45° beyond
    let mesh = grid(4, |x, _| (x - 2.0).max(0.0));
    let params = ChartParams::planar().with_chart_threshold(2);
    let result = create_charts(&mesh, &params).unwrap();

    assert_eq!(result.chart_count(), 2);
    for (id, face) in mesh.faces().iter().enumerate() {
        let expected = result.map.chart_of(0);
        let flat = face.centroid().x < 2.0;
        assert_eq!(result.map.chart_of(id as u32) == expected, flat);
    }
}

// =============================================================================
// Seeding
// =============================================================================

#[test]
fn grid_partition_seeds_clustering() {
    let mesh = grid(6, |x, y| 0.1 * (x + y));
    let labels = grid_partition(&mesh, 3).unwrap();
    let params = ChartParams::with_target_charts(1);
    let result = create_charts_from_partition(&mesh, &labels, &params).unwrap();

    assert_eq!(result.stats.initial_charts, 9);
    assert_eq!(result.chart_count(), 1);
    assert_eq!(result.stats.merges, 8);
}

#[test]
fn partition_seeding_respects_threshold_on_seeds() {
    let mesh = grid(2, |_, _| 0.0);
    let labels = vec![0; mesh.face_count()];
    let result = create_charts_from_partition(&mesh, &labels, &ChartParams::default()).unwrap();

    assert_eq!(result.chart_count(), 1);
    assert_eq!(result.stats.merges, 0);
    assert_eq!(result.stats.halt_reason, HaltReason::QueueEmpty);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn degenerate_face_aborts_with_face_id() {
    let positions = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let err = SurfaceMesh::from_triangles(&positions, &[[0, 1, 2], [1, 1, 2]]).unwrap_err();
    assert_eq!(
        err,
        ChartError::DegenerateFace {
            face: 1,
            edge_count: 1
        }
    );
}

#[test]
fn quads_are_rejected() {
    let positions = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let err = SurfaceMesh::from_polygons(&positions, &[vec![0, 1, 2, 3]]).unwrap_err();
    assert!(matches!(err, ChartError::NotTriangulated { face: 0, vertex_count: 4 }));
}

#[test]
fn empty_mesh_is_an_error() {
    let mesh = SurfaceMesh::from_triangles(&[], &[]).unwrap();
    assert_eq!(
        create_charts(&mesh, &ChartParams::default()).unwrap_err(),
        ChartError::EmptyMesh
    );
}
