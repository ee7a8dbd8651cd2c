//! Result types for chart clustering.

// Chart and face counts are bounded by u32 ids
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use nalgebra::Vector3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::atlas::ChartSet;
use crate::chart::Chart;
use crate::cost::irregularity;
use crate::scheduler::HaltReason;
use crate::surface::FaceId;

/// Face to chart assignment with dense chart ids `0..chart_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChartMap {
    face_charts: Vec<u32>,
    chart_count: usize,
}

impl ChartMap {
    /// Compact the active charts of `charts` in storage order.
    #[must_use]
    pub fn from_chart_set(charts: &ChartSet) -> Self {
        let face_count = charts.charts().len();
        let mut face_charts = vec![0; face_count];
        let mut chart_count = 0;
        for chart in charts.active() {
            for &face in &chart.faces {
                face_charts[face as usize] = chart_count as u32;
            }
            chart_count += 1;
        }
        Self {
            face_charts,
            chart_count,
        }
    }

    /// Chart id of every face, indexed by face id.
    #[must_use]
    pub fn face_charts(&self) -> &[u32] {
        &self.face_charts
    }

    /// Number of charts.
    #[must_use]
    pub const fn chart_count(&self) -> usize {
        self.chart_count
    }

    /// Chart of one face.
    #[must_use]
    pub fn chart_of(&self, face: FaceId) -> Option<u32> {
        self.face_charts.get(face as usize).copied()
    }

    /// Faces of one chart, in ascending order.
    #[must_use]
    pub fn faces_of(&self, chart: u32) -> Vec<FaceId> {
        self.face_charts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == chart)
            .map(|(face, _)| face as FaceId)
            .collect()
    }

    /// Face count of every chart, indexed by chart id.
    #[must_use]
    pub fn chart_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.chart_count];
        for &chart in &self.face_charts {
            sizes[chart as usize] += 1;
        }
        sizes
    }
}

/// Geometry of one final chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChartSummary {
    /// Dense chart id.
    pub id: u32,
    /// Number of faces.
    pub face_count: usize,
    /// Total area.
    pub area: f64,
    /// Boundary length.
    pub perimeter: f64,
    /// Area-weighted unit normal.
    pub avg_normal: Vector3<f64>,
    /// `perimeter² / (4π·area)`.
    pub irregularity: f64,
    /// Whether the chart touches the mesh border.
    pub has_border_edge: bool,
}

impl ChartSummary {
    /// Summarize `chart` under its dense id.
    #[must_use]
    pub fn new(id: u32, chart: &Chart) -> Self {
        Self {
            id,
            face_count: chart.face_count(),
            area: chart.area,
            perimeter: chart.perimeter,
            avg_normal: chart.avg_normal,
            irregularity: irregularity(chart.perimeter, chart.area),
            has_border_edge: chart.has_border_edge,
        }
    }
}

/// Counters of a clustering run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterStats {
    /// Active charts when the join queue was built.
    pub initial_charts: usize,

    /// Active charts at halt.
    pub final_charts: usize,

    /// Number of merges performed.
    pub merges: usize,

    /// Joins dropped because remapping made them duplicate an existing pair.
    pub duplicate_joins_dropped: usize,

    /// Join evaluations that were numerically undefined and got maximal cost.
    pub degenerate_joins: usize,

    /// Why the run stopped.
    pub halt_reason: HaltReason,
}

/// Result of chart clustering.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChartingResult {
    /// Face to chart assignment.
    pub map: ChartMap,

    /// One summary per chart, indexed by chart id.
    pub charts: Vec<ChartSummary>,

    /// Run counters.
    pub stats: ClusterStats,
}

impl ChartingResult {
    /// Number of charts.
    #[must_use]
    pub const fn chart_count(&self) -> usize {
        self.map.chart_count()
    }

    /// Check if any merge occurred.
    #[must_use]
    pub const fn was_clustered(&self) -> bool {
        self.stats.merges > 0
    }

    /// Mean chart irregularity, 0 for an empty result.
    #[must_use]
    pub fn mean_irregularity(&self) -> f64 {
        if self.charts.is_empty() {
            0.0
        } else {
            self.charts.iter().map(|c| c.irregularity).sum::<f64>() / self.charts.len() as f64
        }
    }
}

impl std::fmt::Display for ClusterStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} → {} charts ({} merges, {})",
            self.initial_charts, self.final_charts, self.merges, self.halt_reason
        )
    }
}

impl std::fmt::Display for ChartingResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Charting: {} faces, {} (mean irregularity {:.2})",
            self.map.face_charts().len(),
            self.stats,
            self.mean_irregularity()
        )
    }
}
