//! Chart arena with face ownership and chart adjacency.
//!
//! Charts live in one vector indexed by [`ChartId`]; merging never moves or
//! removes an entry, it only deactivates the absorbed chart. Alongside the
//! charts the arena keeps which chart owns each face and, for every active
//! chart, the total edge length it shares with each neighboring chart. The
//! shared lengths give exact perimeters of candidate unions in O(1) and are
//! updated in O(degree) per merge.

// Face and chart counts are bounded by u32 ids
#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashMap;

use crate::chart::{Chart, ChartId};
use crate::surface::{FaceId, SurfaceMesh};

/// Result of folding one chart into another.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The chart that absorbed the other.
    pub survivor: ChartId,
    /// The absorbed, now inactive chart.
    pub absorbed: ChartId,
    /// Former neighbors of the absorbed chart that were already neighbors
    /// of the survivor; their two boundaries have been folded into one.
    pub folded_neighbors: Vec<ChartId>,
}

/// All charts of a run.
#[derive(Debug, Clone)]
pub struct ChartSet {
    charts: Vec<Chart>,
    face_chart: Vec<ChartId>,
    adjacency: Vec<HashMap<ChartId, f64>>,
    active_count: usize,
}

impl ChartSet {
    /// One chart per face, chart id equal to face id.
    #[must_use]
    pub fn from_surface(mesh: &SurfaceMesh) -> Self {
        let charts = seed_charts(mesh);

        let mut adjacency: Vec<HashMap<ChartId, f64>> = vec![HashMap::new(); charts.len()];
        for edge in mesh.shared_edges() {
            *adjacency[edge.first as usize]
                .entry(edge.second)
                .or_insert(0.0) += edge.length;
            *adjacency[edge.second as usize]
                .entry(edge.first)
                .or_insert(0.0) += edge.length;
        }

        Self {
            face_chart: (0..charts.len() as ChartId).collect(),
            active_count: charts.len(),
            charts,
            adjacency,
        }
    }

    /// All charts, active or not, indexed by id.
    #[must_use]
    pub fn charts(&self) -> &[Chart] {
        &self.charts
    }

    /// Get one chart.
    #[must_use]
    pub fn chart(&self, id: ChartId) -> Option<&Chart> {
        self.charts.get(id as usize)
    }

    /// Iterate over active charts in storage order.
    pub fn active(&self) -> impl Iterator<Item = &Chart> {
        self.charts.iter().filter(|c| c.active)
    }

    /// Number of active charts.
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.active_count
    }

    /// Chart currently owning `face`.
    #[must_use]
    pub fn chart_of_face(&self, face: FaceId) -> Option<ChartId> {
        self.face_chart.get(face as usize).copied()
    }

    /// Active neighbors of a chart with the boundary length shared with each.
    pub fn neighbors(&self, id: ChartId) -> impl Iterator<Item = (ChartId, f64)> + '_ {
        self.adjacency
            .get(id as usize)
            .into_iter()
            .flat_map(|adj| adj.iter().map(|(&n, &len)| (n, len)))
    }

    /// Boundary length shared by two charts (zero if not adjacent).
    #[must_use]
    pub fn shared_length(&self, a: ChartId, b: ChartId) -> f64 {
        self.adjacency
            .get(a as usize)
            .and_then(|adj| adj.get(&b))
            .copied()
            .unwrap_or(0.0)
    }

    /// Which of two charts survives their merge: the one with more faces,
    /// the lower id on ties. Unknown ids count as empty.
    #[must_use]
    pub fn survivor_of(&self, a: ChartId, b: ChartId) -> (ChartId, ChartId) {
        let size = |id: ChartId| self.chart(id).map_or(0, Chart::face_count);
        match size(a).cmp(&size(b)) {
            std::cmp::Ordering::Greater => (a, b),
            std::cmp::Ordering::Less => (b, a),
            std::cmp::Ordering::Equal if a < b => (a, b),
            std::cmp::Ordering::Equal => (b, a),
        }
    }

    /// Merge two distinct active charts.
    ///
    /// Returns `None` (and changes nothing) if the ids are equal, out of
    /// range or not both active.
    pub fn merge(&mut self, a: ChartId, b: ChartId) -> Option<MergeOutcome> {
        if a == b || !self.is_active(a) || !self.is_active(b) {
            return None;
        }
        let (survivor, absorbed) = self.survivor_of(a, b);
        let shared = self.shared_length(survivor, absorbed);

        for &face in &self.charts[absorbed as usize].faces {
            self.face_chart[face as usize] = survivor;
        }

        let (keep, gone) = pair_mut(&mut self.charts, survivor as usize, absorbed as usize);
        keep.merge_with(gone, shared);
        self.active_count -= 1;

        let absorbed_adj = std::mem::take(&mut self.adjacency[absorbed as usize]);
        self.adjacency[survivor as usize].remove(&absorbed);

        let mut folded_neighbors = Vec::new();
        for (neighbor, length) in absorbed_adj {
            if neighbor == survivor {
                continue;
            }
            let neighbor_adj = &mut self.adjacency[neighbor as usize];
            neighbor_adj.remove(&absorbed);
            *neighbor_adj.entry(survivor).or_insert(0.0) += length;

            let survivor_adj = &mut self.adjacency[survivor as usize];
            if let Some(existing) = survivor_adj.get_mut(&neighbor) {
                *existing += length;
                folded_neighbors.push(neighbor);
            } else {
                survivor_adj.insert(neighbor, length);
            }
        }

        Some(MergeOutcome {
            survivor,
            absorbed,
            folded_neighbors,
        })
    }

    /// Whether `id` names an active chart.
    #[must_use]
    pub fn is_active(&self, id: ChartId) -> bool {
        self.charts.get(id as usize).is_some_and(|c| c.active)
    }
}

#[cfg(not(feature = "parallel"))]
fn seed_charts(mesh: &SurfaceMesh) -> Vec<Chart> {
    mesh.faces()
        .iter()
        .enumerate()
        .map(|(idx, face)| Chart::from_face(idx as ChartId, idx as FaceId, face))
        .collect()
}

#[cfg(feature = "parallel")]
fn seed_charts(mesh: &SurfaceMesh) -> Vec<Chart> {
    use rayon::prelude::*;

    mesh.faces()
        .par_iter()
        .enumerate()
        .map(|(idx, face)| Chart::from_face(idx as ChartId, idx as FaceId, face))
        .collect()
}

/// Mutable references to two distinct elements.
fn pair_mut<T>(items: &mut [T], first: usize, second: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(first, second);
    if first < second {
        let (lo, hi) = items.split_at_mut(second);
        (&mut lo[first], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(first);
        (&mut hi[0], &mut lo[second])
    }
}
