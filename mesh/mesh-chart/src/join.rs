//! Join operations and the cost-ordered join queue.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use hashbrown::HashMap;

use crate::chart::ChartId;

/// A candidate merge of two adjacent charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinOperation {
    /// Lower chart id of the pair.
    pub chart1: ChartId,
    /// Higher chart id of the pair.
    pub chart2: ChartId,
    /// Merge cost; `f64::INFINITY` marks a join that must never be performed.
    pub cost: f64,
}

impl JoinOperation {
    /// Create a join, normalizing the pair so `chart1 < chart2`.
    ///
    /// NaN costs are stored as `+∞`.
    #[must_use]
    pub fn new(a: ChartId, b: ChartId, cost: f64) -> Self {
        let (chart1, chart2) = normalize_pair(a, b);
        Self {
            chart1,
            chart2,
            cost: if cost.is_nan() { f64::INFINITY } else { cost },
        }
    }

    /// The unordered chart pair.
    #[must_use]
    pub const fn pair(&self) -> (ChartId, ChartId) {
        (self.chart1, self.chart2)
    }

    /// Whether the join references `chart`.
    #[must_use]
    pub const fn touches(&self, chart: ChartId) -> bool {
        self.chart1 == chart || self.chart2 == chart
    }
}

/// Queue ordering: cheapest first, ties broken by chart pair.
#[derive(Debug, Clone, Copy)]
struct QueuedJoin(JoinOperation);

impl PartialEq for QueuedJoin {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedJoin {}

impl PartialOrd for QueuedJoin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedJoin {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .cost
            .total_cmp(&other.0.cost)
            .then_with(|| self.0.pair().cmp(&other.0.pair()))
    }
}

/// Cost-ordered set of joins with at most one entry per chart pair.
///
/// Supports removal and re-insertion of arbitrary entries, so costs can be
/// repaired in place instead of leaving stale entries behind.
#[derive(Debug, Clone, Default)]
pub struct JoinQueue {
    ordered: BTreeSet<QueuedJoin>,
    costs: HashMap<(ChartId, ChartId), f64>,
}

impl JoinQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a join, replacing any queued join for the same pair.
    ///
    /// Returns the replaced cost, if any.
    pub fn insert(&mut self, join: JoinOperation) -> Option<f64> {
        let previous = self.remove(join.chart1, join.chart2);
        self.costs.insert(join.pair(), join.cost);
        self.ordered.insert(QueuedJoin(join));
        previous
    }

    /// Remove the join for a pair, returning its cost.
    pub fn remove(&mut self, a: ChartId, b: ChartId) -> Option<f64> {
        let pair = normalize_pair(a, b);
        let cost = self.costs.remove(&pair)?;
        self.ordered.remove(&QueuedJoin(JoinOperation {
            chart1: pair.0,
            chart2: pair.1,
            cost,
        }));
        Some(cost)
    }

    /// Cheapest join without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<JoinOperation> {
        self.ordered.first().map(|q| q.0)
    }

    /// Remove and return the cheapest join.
    pub fn pop(&mut self) -> Option<JoinOperation> {
        let QueuedJoin(join) = self.ordered.pop_first()?;
        self.costs.remove(&join.pair());
        Some(join)
    }

    /// Queued cost for a pair.
    #[must_use]
    pub fn cost(&self, a: ChartId, b: ChartId) -> Option<f64> {
        self.costs.get(&normalize_pair(a, b)).copied()
    }

    /// Whether a join for the pair is queued.
    #[must_use]
    pub fn contains(&self, a: ChartId, b: ChartId) -> bool {
        self.costs.contains_key(&normalize_pair(a, b))
    }

    /// Number of queued joins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    /// Check if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Iterate over queued joins, cheapest first.
    pub fn iter(&self) -> impl Iterator<Item = JoinOperation> + '_ {
        self.ordered.iter().map(|q| q.0)
    }
}

const fn normalize_pair(a: ChartId, b: ChartId) -> (ChartId, ChartId) {
    if a < b { (a, b) } else { (b, a) }
}
