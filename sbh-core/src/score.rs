//! Fitness of a candidate read ordering.
//!
//! A path earns `PERFECT_EDGE_REWARD` for every consecutive pair joined by a
//! one-base shift, minus `TOTAL_COST_WEIGHT` times the residual shift cost.
//! The residual cost term carries zero weight by default and therefore has no
//! effect on fitness unless a caller overrides the weight.

use crate::overlap::{CostMatrix, PERFECT_SHIFT};
use serde::{Deserialize, Serialize};

/// Reward per consecutive pair with a one-base shift
pub const PERFECT_EDGE_REWARD: f64 = 1000.0;

/// Weight of the residual total-cost term
pub const TOTAL_COST_WEIGHT: f64 = 0.0;

/// Which matrix entry is read as the shift of a consecutive pair `(a, b)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeOrientation {
    /// `D[b][a]`
    #[default]
    Incoming,
    /// `D[a][b]`, the direction used by path construction and merging
    Outgoing,
}

impl EdgeOrientation {
    pub fn shift(self, costs: &CostMatrix, from: usize, to: usize) -> i32 {
        match self {
            EdgeOrientation::Incoming => costs[(to, from)],
            EdgeOrientation::Outgoing => costs[(from, to)],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub perfect_reward: f64,
    pub cost_weight: f64,
    pub orientation: EdgeOrientation,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            perfect_reward: PERFECT_EDGE_REWARD,
            cost_weight: TOTAL_COST_WEIGHT,
            orientation: EdgeOrientation::default(),
        }
    }
}

/// Breakdown of a path's fitness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathScore {
    /// Consecutive pairs joined by a one-base shift
    pub perfect: usize,
    /// Sum of shifts over all pairs, minus `perfect` and the read count
    pub total_cost: i64,
    pub fitness: f64,
}

pub fn evaluate(path: &[usize], costs: &CostMatrix, weights: &ScoreWeights) -> PathScore {
    let mut perfect = 0usize;
    let mut shift_sum = 0i64;

    for pair in path.windows(2) {
        let shift = weights.orientation.shift(costs, pair[0], pair[1]);
        if shift == PERFECT_SHIFT {
            perfect += 1;
        }
        shift_sum += i64::from(shift);
    }

    let total_cost = shift_sum - perfect as i64 - costs.rows() as i64;
    let fitness = weights.perfect_reward * perfect as f64 - weights.cost_weight * total_cost as f64;

    PathScore { perfect, total_cost, fitness }
}

/// Fitness under the default weights
pub fn score(path: &[usize], costs: &CostMatrix) -> f64 {
    evaluate(path, costs, &ScoreWeights::default()).fitness
}
