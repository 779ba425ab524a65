//! Ant colony optimisation over the read-overlap graph
//!
//! Every iteration a colony of ants walks the complete graph of reads from the
//! anchor, choosing each next read with probability proportional to
//! `pheromone^alpha * visibility^beta` among the reads it has not visited.
//! Paths are scored, the global best is kept, and the pheromone matrix is
//! evaporated, floor-clamped and reinforced along every ant's path.
//!
//! Ants of one iteration share an immutable snapshot of the desirability
//! matrix and are built in parallel, each with a private RNG seeded from the
//! engine's RNG, so results depend only on the seed and not on thread count.

use crate::matrix::{normalize_masked, Matrix, MatrixError};
use crate::overlap::{build_cost_matrix, CostMatrix, SELF_OVERLAP};
use crate::score::{evaluate, ScoreWeights};
use crate::types::{ReadSet, ANCHOR};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exponent applied to the overlap shift when deriving visibility
pub const VISIBILITY_EXPONENT: i32 = 3;

/// Upper bound on ants per read
pub const MAX_ANTS_RATIO: f64 = 100.0;

/// Errors that can occur while configuring or running the colony
#[derive(Debug, Error)]
pub enum AcoError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid cost matrix: {0}")]
    InvalidCostMatrix(String),

    #[error("Instance has no reads")]
    EmptyInstance,

    #[error("Ant {ant} stalled at read {node}: no unvisited read has positive desirability")]
    ConstructionStalled { ant: usize, node: usize },

    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),
}

pub type AcoResult<T> = Result<T, AcoError>;

/// What an ant does when every unvisited read has zero desirability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DegeneratePolicy {
    /// Pick uniformly among the unvisited reads
    #[default]
    UniformFallback,
    /// Abort the iteration with `AcoError::ConstructionStalled`
    Fail,
}

/// Parameters for the colony
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcoParams {
    /// Ants per iteration as a fraction of the read count
    pub ants_ratio: f64,
    /// Pheromone exponent
    pub alpha: f64,
    /// Visibility exponent
    pub beta: f64,
    /// Reinforcement scale
    pub q: f64,
    /// Fraction of pheromone lost per iteration, in `[0, 1]`
    pub evaporation_rate: f64,
    /// Lower bound for every pheromone entry after evaporation
    pub pheromone_floor: f64,
    pub weights: ScoreWeights,
    pub degenerate_policy: DegeneratePolicy,
    /// Optional deterministic seed; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for AcoParams {
    fn default() -> Self {
        Self {
            ants_ratio: 0.5,
            alpha: 5.0,
            beta: 3.0,
            q: 1000.0,
            evaporation_rate: 0.1,
            pheromone_floor: 1.0,
            weights: ScoreWeights::default(),
            degenerate_policy: DegeneratePolicy::default(),
            seed: None,
        }
    }
}

impl AcoParams {
    pub fn validate(&self) -> AcoResult<()> {
        fn invalid(message: String) -> AcoResult<()> {
            Err(AcoError::InvalidParams(message))
        }

        if !(self.ants_ratio > 0.0 && self.ants_ratio <= MAX_ANTS_RATIO) {
            return invalid(format!(
                "ants ratio must lie in (0, {MAX_ANTS_RATIO}], got {}",
                self.ants_ratio
            ));
        }
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return invalid(format!("alpha must be non-negative, got {}", self.alpha));
        }
        if !(self.beta.is_finite() && self.beta >= 0.0) {
            return invalid(format!("beta must be non-negative, got {}", self.beta));
        }
        if !(self.q.is_finite() && self.q > 0.0) {
            return invalid(format!("q must be positive, got {}", self.q));
        }
        if !(0.0..=1.0).contains(&self.evaporation_rate) {
            return invalid(format!(
                "evaporation rate must lie in [0, 1], got {}",
                self.evaporation_rate
            ));
        }
        if !(self.pheromone_floor.is_finite() && self.pheromone_floor >= 0.0) {
            return invalid(format!(
                "pheromone floor must be non-negative, got {}",
                self.pheromone_floor
            ));
        }
        if !(self.weights.perfect_reward.is_finite() && self.weights.cost_weight.is_finite()) {
            return invalid("score weights must be finite".to_string());
        }
        Ok(())
    }

    /// Number of ants for an instance of `reads` reads, never less than one
    pub fn ants_count(&self, reads: usize) -> usize {
        ((reads as f64 * self.ants_ratio).floor() as usize).max(1)
    }
}

/// Outcome of a single colony iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationSummary {
    /// 1-based iteration number
    pub iteration: usize,
    pub iteration_best: f64,
    pub best_score: f64,
    pub improved: bool,
}

/// Snapshot of the best ordering found so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub path: Option<Vec<usize>>,
    pub score: f64,
    /// Best score of each iteration, in order
    pub history: Vec<f64>,
}

pub struct AcoEngine {
    params: AcoParams,
    costs: CostMatrix,
    visibility: Matrix<f64>,
    pheromones: Matrix<f64>,
    ants_count: usize,
    rng: StdRng,
    best_score: f64,
    best_path: Option<Vec<usize>>,
    history: Vec<f64>,
}

impl AcoEngine {
    /// Create an engine over a precomputed overlap cost matrix
    pub fn new(costs: CostMatrix, params: AcoParams) -> AcoResult<Self> {
        params.validate()?;
        validate_cost_matrix(&costs)?;

        let n = costs.rows();
        let visibility = visibility_matrix(&costs);
        let pheromones = Matrix::filled(n, n, 1.0);
        let ants_count = params.ants_count(n);
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        log::debug!(
            "ACO engine: {} reads, {} ants, alpha={}, beta={}, q={}, evaporation={}",
            n,
            ants_count,
            params.alpha,
            params.beta,
            params.q,
            params.evaporation_rate
        );

        Ok(Self {
            params,
            costs,
            visibility,
            pheromones,
            ants_count,
            rng,
            best_score: f64::NEG_INFINITY,
            best_path: None,
            history: Vec::new(),
        })
    }

    /// Create an engine from raw reads, building the cost matrix first
    pub fn from_reads(reads: &ReadSet, params: AcoParams) -> AcoResult<Self> {
        Self::new(build_cost_matrix(reads), params)
    }

    pub fn params(&self) -> &AcoParams {
        &self.params
    }

    pub fn costs(&self) -> &CostMatrix {
        &self.costs
    }

    pub fn visibility(&self) -> &Matrix<f64> {
        &self.visibility
    }

    pub fn pheromones(&self) -> &Matrix<f64> {
        &self.pheromones
    }

    pub fn size(&self) -> usize {
        self.costs.rows()
    }

    pub fn ants_count(&self) -> usize {
        self.ants_count
    }

    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    pub fn best_path(&self) -> Option<&[usize]> {
        self.best_path.as_deref()
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn solution(&self) -> Solution {
        Solution {
            path: self.best_path.clone(),
            score: self.best_score,
            history: self.history.clone(),
        }
    }

    /// Combined desirability `pheromone^alpha * visibility^beta`.
    ///
    /// Entries with zero visibility stay zero whatever the exponents.
    pub fn desirability(&self) -> AcoResult<Matrix<f64>> {
        let weighted = self
            .pheromones
            .powf(self.params.alpha)
            .hadamard(&self.visibility.powf(self.params.beta))?;
        let masked = weighted.zip_with(&self.visibility, |&p, &vis| if vis > 0.0 { p } else { 0.0 })?;
        Ok(masked)
    }

    /// Run one iteration: construct, score, update the best and the pheromones
    pub fn step(&mut self) -> AcoResult<IterationSummary> {
        let paths = self.construct_paths()?;

        let scores: Vec<f64> = paths
            .par_iter()
            .map(|path| evaluate(path, &self.costs, &self.params.weights).fitness)
            .collect();

        let (best_ant, iteration_best) = first_argmax(&scores).ok_or_else(|| {
            AcoError::InvalidParams("iteration produced no ant paths".to_string())
        })?;

        let improved = iteration_best > self.best_score;
        if improved {
            log::info!(
                "Iteration {}: new best score {} (previous {})",
                self.history.len() + 1,
                iteration_best,
                self.best_score
            );
            self.best_score = iteration_best;
            self.best_path = Some(paths[best_ant].clone());
        }

        self.evaporate();
        self.reinforce(&paths);
        self.history.push(iteration_best);

        log::debug!(
            "Iteration {}: iteration best {}, global best {}",
            self.history.len(),
            iteration_best,
            self.best_score
        );

        Ok(IterationSummary {
            iteration: self.history.len(),
            iteration_best,
            best_score: self.best_score,
            improved,
        })
    }

    /// Build one path per ant from a shared desirability snapshot
    pub fn construct_paths(&mut self) -> AcoResult<Vec<Vec<usize>>> {
        let desirability = self.desirability()?;
        let seeds: Vec<u64> = (0..self.ants_count).map(|_| self.rng.gen()).collect();
        let policy = self.params.degenerate_policy;

        seeds
            .into_par_iter()
            .enumerate()
            .map(|(ant, seed)| {
                let mut rng = StdRng::seed_from_u64(seed);
                construct_path(ant, &desirability, policy, &mut rng)
            })
            .collect()
    }

    /// Scale every pheromone entry by `1 - evaporation_rate`, then raise
    /// entries below the floor up to it
    pub fn evaporate(&mut self) {
        self.pheromones.scale(1.0 - self.params.evaporation_rate);
        self.pheromones.clamp_min(self.params.pheromone_floor);
    }

    /// Deposit `q / shift` on both directions of every edge of every path
    pub(crate) fn reinforce(&mut self, paths: &[Vec<usize>]) {
        let q = self.params.q;
        for path in paths {
            for pair in path.windows(2) {
                let (from, to) = (pair[0], pair[1]);
                let incoming = self.costs[(to, from)];
                let outgoing = self.costs[(from, to)];
                self.pheromones.add_at(to, from, q / f64::from(incoming));
                self.pheromones.add_at(from, to, q / f64::from(outgoing));
            }
        }
    }
}

/// Walk one ant from the anchor until every read is visited
fn construct_path(
    ant: usize,
    desirability: &Matrix<f64>,
    policy: DegeneratePolicy,
    rng: &mut StdRng,
) -> AcoResult<Vec<usize>> {
    let n = desirability.rows();
    let mut unvisited = vec![true; n];
    let mut path = Vec::with_capacity(n);

    let mut current = ANCHOR;
    unvisited[current] = false;
    path.push(current);

    for _ in 1..n {
        let sampled = normalize_masked(desirability.row(current), &unvisited)
            .and_then(|probabilities| WeightedIndex::new(&probabilities).ok())
            .map(|distribution| distribution.sample(rng));

        let next = match (sampled, policy) {
            (Some(next), _) => next,
            (None, DegeneratePolicy::UniformFallback) => {
                log::trace!("Ant {} at read {}: degenerate row, sampling uniformly", ant, current);
                let candidates: Vec<usize> = (0..n).filter(|&j| unvisited[j]).collect();
                *candidates
                    .choose(rng)
                    .ok_or(AcoError::ConstructionStalled { ant, node: current })?
            }
            (None, DegeneratePolicy::Fail) => {
                return Err(AcoError::ConstructionStalled { ant, node: current });
            }
        };

        unvisited[next] = false;
        path.push(next);
        current = next;
    }

    Ok(path)
}

/// `1 / shift^3` for valid entries, zero on the diagonal and non-positive shifts
fn visibility_matrix(costs: &CostMatrix) -> Matrix<f64> {
    costs.map(|&shift| {
        if shift > 0 {
            1.0 / f64::from(shift).powi(VISIBILITY_EXPONENT)
        } else {
            0.0
        }
    })
}

fn validate_cost_matrix(costs: &CostMatrix) -> AcoResult<()> {
    if costs.rows() == 0 {
        return Err(AcoError::EmptyInstance);
    }
    if !costs.is_square() {
        return Err(AcoError::InvalidCostMatrix(format!(
            "expected a square matrix, got {}x{}",
            costs.rows(),
            costs.cols()
        )));
    }
    for (i, j, &shift) in costs.indexed_iter() {
        if i == j && shift != SELF_OVERLAP {
            return Err(AcoError::InvalidCostMatrix(format!(
                "diagonal entry ({i}, {i}) is {shift}, expected {SELF_OVERLAP}"
            )));
        }
        if i != j && shift < 1 {
            return Err(AcoError::InvalidCostMatrix(format!(
                "entry ({i}, {j}) is {shift}, shifts must be at least 1"
            )));
        }
    }
    Ok(())
}

/// Index and value of the first maximum
fn first_argmax(values: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best
}
