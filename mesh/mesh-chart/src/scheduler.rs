//! Greedy join scheduling.
//!
//! The scheduler owns the chart arena and a [`JoinQueue`] holding one join
//! per pair of adjacent active charts. Each step performs the cheapest join,
//! then repairs the queue: joins of the absorbed chart are removed, and every
//! join touching the survivor is re-costed against the grown chart. After
//! every step the queue references only active charts and each queued cost
//! equals a fresh evaluation of [`cost_of_join`].

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::atlas::ChartSet;
use crate::chart::ChartId;
use crate::cost::cost_of_join;
use crate::error::ChartResult;
use crate::join::{JoinOperation, JoinQueue};
use crate::params::ChartParams;
use crate::result::ClusterStats;

/// Why clustering stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HaltReason {
    /// No joins left; every connected component is a single chart.
    QueueEmpty,
    /// The cheapest join costs at least the cost threshold.
    CostThreshold,
    /// The active chart count reached the chart threshold.
    ChartThreshold,
    /// The merge cap was reached.
    MergeLimit,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::QueueEmpty => "no joins left",
            Self::CostThreshold => "cost threshold reached",
            Self::ChartThreshold => "chart threshold reached",
            Self::MergeLimit => "merge limit reached",
        };
        f.write_str(text)
    }
}

/// Build/drain/merge/repair loop over a [`ChartSet`].
#[derive(Debug, Clone)]
pub struct JoinScheduler {
    charts: ChartSet,
    queue: JoinQueue,
    params: ChartParams,
    initial_charts: usize,
    merges: usize,
    duplicate_joins_dropped: usize,
    degenerate_joins: usize,
    desired_merges: usize,
}

impl JoinScheduler {
    /// Queue one join per pair of adjacent active charts.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidParameter`](crate::ChartError::InvalidParameter)
    /// if the parameters are invalid.
    pub fn new(charts: ChartSet, params: &ChartParams) -> ChartResult<Self> {
        params.validate()?;
        let initial_charts = charts.active_count();
        let mut desired = initial_charts.saturating_sub(params.chart_threshold);
        if let Some(cap) = params.max_merges {
            desired = desired.min(cap);
        }

        let mut scheduler = Self {
            charts,
            queue: JoinQueue::new(),
            params: params.clone(),
            initial_charts,
            merges: 0,
            duplicate_joins_dropped: 0,
            degenerate_joins: 0,
            desired_merges: desired,
        };

        let pairs: Vec<(ChartId, ChartId)> = scheduler
            .charts
            .active()
            .flat_map(|chart| {
                let id = chart.id;
                scheduler
                    .charts
                    .neighbors(id)
                    .filter(move |&(n, _)| n > id)
                    .map(move |(n, _)| (id, n))
            })
            .collect();
        for (a, b) in pairs {
            let cost = scheduler.queued_cost(a, b);
            scheduler.queue.insert(JoinOperation::new(a, b, cost));
        }

        info!(
            charts = initial_charts,
            joins = scheduler.queue.len(),
            chart_threshold = params.chart_threshold,
            cost_threshold = params.cost_threshold,
            "Starting chart clustering"
        );

        Ok(scheduler)
    }

    /// The chart arena in its current state.
    #[must_use]
    pub const fn charts(&self) -> &ChartSet {
        &self.charts
    }

    /// The pending joins.
    #[must_use]
    pub const fn queue(&self) -> &JoinQueue {
        &self.queue
    }

    /// Merges performed so far.
    #[must_use]
    pub const fn merges(&self) -> usize {
        self.merges
    }

    /// Joins queued at `+∞` because their cost was undefined.
    #[must_use]
    pub const fn degenerate_joins(&self) -> usize {
        self.degenerate_joins
    }

    /// Current cost of joining two charts.
    ///
    /// `None` if either id is unknown or the cost is undefined (no plane
    /// fit, zero area).
    #[must_use]
    pub fn join_cost(&self, a: ChartId, b: ChartId) -> Option<f64> {
        let shared = self.charts.shared_length(a, b);
        let (c1, c2) = (self.charts.chart(a)?, self.charts.chart(b)?);
        cost_of_join(c1, c2, shared, &self.params.weights)
    }

    /// Cost to queue a join at; undefined costs are logged, counted and
    /// mapped to `+∞`.
    fn queued_cost(&mut self, a: ChartId, b: ChartId) -> f64 {
        self.join_cost(a, b).unwrap_or_else(|| {
            warn!(chart1 = a, chart2 = b, "Degenerate join, assigning maximal cost");
            self.degenerate_joins += 1;
            f64::INFINITY
        })
    }

    /// First halting condition that currently holds, if any.
    #[must_use]
    pub fn halt_reason(&self) -> Option<HaltReason> {
        let Some(front) = self.queue.peek() else {
            return Some(HaltReason::QueueEmpty);
        };
        if front.cost >= self.params.cost_threshold {
            return Some(HaltReason::CostThreshold);
        }
        if self.charts.active_count() <= self.params.chart_threshold {
            return Some(HaltReason::ChartThreshold);
        }
        if self.params.max_merges.is_some_and(|cap| self.merges >= cap) {
            return Some(HaltReason::MergeLimit);
        }
        None
    }

    /// Perform the cheapest join and repair the queue.
    ///
    /// # Errors
    ///
    /// Returns the [`HaltReason`] instead when clustering is finished.
    pub fn step(&mut self) -> Result<JoinOperation, HaltReason> {
        let (join, survivor, absorbed, stale, outcome) = loop {
            if let Some(reason) = self.halt_reason() {
                return Err(reason);
            }
            let join = self.queue.pop().ok_or(HaltReason::QueueEmpty)?;

            let (survivor, absorbed) = self.charts.survivor_of(join.chart1, join.chart2);
            let stale: Vec<ChartId> = self
                .charts
                .neighbors(absorbed)
                .map(|(n, _)| n)
                .filter(|&n| n != survivor)
                .collect();

            if let Some(outcome) = self.charts.merge(survivor, absorbed) {
                break (join, survivor, absorbed, stale, outcome);
            }
            // Unreachable while the queue holds only active pairs
            debug!(
                chart1 = join.chart1,
                chart2 = join.chart2,
                "Skipping join of inactive chart"
            );
        };
        trace!(
            survivor = outcome.survivor,
            absorbed = outcome.absorbed,
            cost = join.cost,
            "Merged charts"
        );
        trace!(chart = survivor, "Dropped self join");

        for neighbor in stale {
            self.queue.remove(absorbed, neighbor);
        }
        for &neighbor in &outcome.folded_neighbors {
            debug!(survivor, absorbed, neighbor, "Dropped duplicate join after remap");
        }
        self.duplicate_joins_dropped += outcome.folded_neighbors.len();

        let neighbors: Vec<ChartId> = self.charts.neighbors(survivor).map(|(n, _)| n).collect();
        for neighbor in neighbors {
            let cost = self.queued_cost(survivor, neighbor);
            self.queue.insert(JoinOperation::new(survivor, neighbor, cost));
        }

        self.merges += 1;
        let progress_step = (self.desired_merges / 10).max(1);
        if self.merges % progress_step == 0 {
            info!(
                merges = self.merges,
                percent = (self.merges * 100 / self.desired_merges.max(1)).min(100),
                active = self.charts.active_count(),
                "Chart clustering progress"
            );
        }

        Ok(join)
    }

    /// Drain the queue until a halting condition holds.
    ///
    /// Returns the final chart arena and run statistics.
    #[must_use]
    pub fn run(mut self) -> (ChartSet, ClusterStats) {
        let halt_reason = loop {
            if let Err(reason) = self.step() {
                break reason;
            }
        };

        info!(
            merges = self.merges,
            charts = self.charts.active_count(),
            reason = %halt_reason,
            "Chart clustering complete"
        );

        let stats = ClusterStats {
            initial_charts: self.initial_charts,
            final_charts: self.charts.active_count(),
            merges: self.merges,
            duplicate_joins_dropped: self.duplicate_joins_dropped,
            degenerate_joins: self.degenerate_joins,
            halt_reason,
        };
        (self.charts, stats)
    }
}
