//! Parameters for chart clustering.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Weights of the three terms of the join cost.
///
/// All terms are dimensionless, so the weights are plain unitless factors.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostWeights {
    /// Weight of the planarity term (mean squared point-to-plane distance). Default: 1.0
    pub fit: f64,

    /// Weight of the orientation term (normal deviation from the fit plane). Default: 1.0
    pub orientation: f64,

    /// Weight of the compactness term (change in irregularity). Default: 1.0
    pub shape: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            fit: 1.0,
            orientation: 1.0,
            shape: 1.0,
        }
    }
}

impl CostWeights {
    /// Create weights from the three coefficients.
    #[must_use]
    pub const fn new(fit: f64, orientation: f64, shape: f64) -> Self {
        Self {
            fit,
            orientation,
            shape,
        }
    }

    /// Geometry-only weights: planarity and orientation, no shape penalty.
    #[must_use]
    pub const fn planar() -> Self {
        Self::new(1.0, 1.0, 0.0)
    }

    /// Check that every weight is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidParameter`] naming the first bad weight.
    pub fn validate(&self) -> ChartResult<()> {
        for (name, value) in [
            ("fit", self.fit),
            ("orientation", self.orientation),
            ("shape", self.shape),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Parameters for chart clustering.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChartParams {
    /// Cost term weights.
    pub weights: CostWeights,

    /// Joins whose cost is at or above this value are never performed.
    /// Default: +∞ (no cost limit)
    pub cost_threshold: f64,

    /// Clustering stops once the number of active charts drops to this value.
    /// Default: 100
    pub chart_threshold: usize,

    /// Optional cap on the number of merges performed. Default: None
    pub max_merges: Option<usize>,
}

impl Default for ChartParams {
    fn default() -> Self {
        Self {
            weights: CostWeights::default(),
            cost_threshold: f64::INFINITY,
            chart_threshold: 100,
            max_merges: None,
        }
    }
}

impl ChartParams {
    /// Create params targeting a number of charts.
    #[must_use]
    pub fn with_target_charts(count: usize) -> Self {
        Self {
            chart_threshold: count,
            ..Default::default()
        }
    }

    /// Create params that ignore compactness and cluster on geometry only.
    #[must_use]
    pub fn planar() -> Self {
        Self {
            weights: CostWeights::planar(),
            ..Default::default()
        }
    }

    /// Set the chart threshold.
    #[must_use]
    pub const fn with_chart_threshold(mut self, count: usize) -> Self {
        self.chart_threshold = count;
        self
    }

    /// Set the cost threshold.
    #[must_use]
    pub const fn with_cost_threshold(mut self, cost: f64) -> Self {
        self.cost_threshold = cost;
        self
    }

    /// Set the cost term weights.
    #[must_use]
    pub const fn with_weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Cap the number of merges.
    #[must_use]
    pub const fn with_max_merges(mut self, merges: usize) -> Self {
        self.max_merges = Some(merges);
        self
    }

    /// Check the parameters before a run.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidParameter`] for a NaN cost threshold or
    /// an invalid weight.
    pub fn validate(&self) -> ChartResult<()> {
        if self.cost_threshold.is_nan() {
            return Err(ChartError::InvalidParameter {
                name: "cost_threshold",
                value: self.cost_threshold,
            });
        }
        self.weights.validate()
    }
}
