//! Run controller
//!
//! Drives repeated colony iterations until one of three independent stop
//! conditions fires: an iteration cap, a wall-clock timeout, or a run of
//! consecutive iterations without improvement of the global best. Conditions
//! are evaluated after every iteration in that order, so a slow iteration may
//! overrun the timeout.

use crate::aco::{AcoEngine, AcoError, AcoResult, Solution};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Run-level stop conditions; at least one must be set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub max_iterations: Option<usize>,
    /// Wall-clock limit in seconds
    pub timeout_secs: Option<f64>,
    /// Consecutive non-improving iterations tolerated before stopping
    pub dropout_threshold: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_iterations: None,
            timeout_secs: Some(300.0),
            dropout_threshold: Some(3),
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> AcoResult<()> {
        if self.max_iterations == Some(0) {
            return Err(AcoError::InvalidParams("max iterations must be at least 1".to_string()));
        }
        if self.dropout_threshold == Some(0) {
            return Err(AcoError::InvalidParams("dropout threshold must be at least 1".to_string()));
        }
        if let Some(secs) = self.timeout_secs {
            if Duration::try_from_secs_f64(secs).is_err() {
                return Err(AcoError::InvalidParams(format!(
                    "timeout must be a non-negative, representable number of seconds, got {secs}"
                )));
            }
        }
        if self.max_iterations.is_none() && self.timeout_secs.is_none() && self.dropout_threshold.is_none() {
            return Err(AcoError::InvalidParams(
                "no stop condition configured, the run would never terminate".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    MaxIterations,
    Timeout,
    Stagnation,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::MaxIterations => write!(f, "maximum iterations reached"),
            StopReason::Timeout => write!(f, "timeout"),
            StopReason::Stagnation => write!(f, "no improvement"),
        }
    }
}

/// Decision taken after each iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Stop(StopReason),
}

/// Stop-condition bookkeeping, separated from the engine so it can be driven
/// by any iteration source
#[derive(Debug, Clone)]
pub struct Termination {
    max_iterations: Option<usize>,
    timeout: Option<Duration>,
    dropout_threshold: Option<usize>,
    last_best: f64,
    stagnant: usize,
}

impl Termination {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            timeout: config.timeout(),
            dropout_threshold: config.dropout_threshold,
            last_best: f64::NEG_INFINITY,
            stagnant: 0,
        }
    }

    /// Consecutive non-improving iterations observed so far
    pub fn stagnant(&self) -> usize {
        self.stagnant
    }

    pub fn observe(&mut self, iterations: usize, elapsed: Duration, best_score: f64) -> Tick {
        if self.max_iterations.is_some_and(|cap| iterations >= cap) {
            return Tick::Stop(StopReason::MaxIterations);
        }

        if let Some(timeout) = self.timeout {
            if elapsed > timeout {
                return Tick::Stop(StopReason::Timeout);
            }
        }

        if best_score > self.last_best {
            self.last_best = best_score;
            self.stagnant = 0;
        } else {
            self.stagnant += 1;
            if self.dropout_threshold.is_some_and(|threshold| self.stagnant >= threshold) {
                return Tick::Stop(StopReason::Stagnation);
            }
        }

        Tick::Continue
    }
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub reason: StopReason,
    pub iterations: usize,
    pub elapsed_secs: f64,
    pub solution: Solution,
}

pub struct RunController {
    config: RunConfig,
}

impl RunController {
    pub fn new(config: RunConfig) -> AcoResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn run(&self, engine: &mut AcoEngine) -> AcoResult<RunOutcome> {
        self.run_with_progress(engine, |_| {})
    }

    /// Run to completion, calling `on_step` with the number of iterations
    /// done by this run. Engine errors abort the run immediately.
    ///
    /// The iteration cap counts only this run, so an engine that was stepped
    /// or run before still stops within `max_iterations` further iterations.
    pub fn run_with_progress<F>(&self, engine: &mut AcoEngine, mut on_step: F) -> AcoResult<RunOutcome>
    where
        F: FnMut(usize),
    {
        let start = Instant::now();
        let already_done = engine.history().len();
        let mut termination = Termination::new(&self.config);

        loop {
            engine.step()?;
            let iterations = engine.history().len() - already_done;
            on_step(iterations);

            if let Tick::Stop(reason) = termination.observe(iterations, start.elapsed(), engine.best_score()) {
                let elapsed = start.elapsed();
                log::info!(
                    "Terminating after {} iterations ({:.2}s): {}",
                    iterations,
                    elapsed.as_secs_f64(),
                    reason
                );
                return Ok(RunOutcome {
                    reason,
                    iterations,
                    elapsed_secs: elapsed.as_secs_f64(),
                    solution: engine.solution(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aco::AcoParams;
    use crate::types::ReadSet;

    fn engine(seed: u64) -> AcoEngine {
        let reads = ReadSet::new(
            ["ACGTAC", "CGTACG", "GTACGG", "TACGGA", "ACGGAT", "CGGATT"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
        .unwrap();
        AcoEngine::from_reads(
            &reads,
            AcoParams {
                seed: Some(seed),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.max_iterations, None);
        assert_eq!(config.timeout(), Some(Duration::from_secs(300)));
        assert_eq!(config.dropout_threshold, Some(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        let never_stops = RunConfig {
            max_iterations: None,
            timeout_secs: None,
            dropout_threshold: None,
        };
        assert!(RunController::new(never_stops).is_err());

        let zero_cap = RunConfig { max_iterations: Some(0), ..Default::default() };
        assert!(zero_cap.validate().is_err());

        let zero_dropout = RunConfig { dropout_threshold: Some(0), ..Default::default() };
        assert!(zero_dropout.validate().is_err());

        let negative_timeout = RunConfig { timeout_secs: Some(-1.0), ..Default::default() };
        assert!(negative_timeout.validate().is_err());

        let huge_timeout = RunConfig { timeout_secs: Some(1e30), ..Default::default() };
        assert!(huge_timeout.validate().is_err());

        let nan_timeout = RunConfig { timeout_secs: Some(f64::NAN), ..Default::default() };
        assert!(nan_timeout.validate().is_err());
    }

    #[test]
    fn test_termination_order() {
        let config = RunConfig {
            max_iterations: Some(2),
            timeout_secs: Some(0.0),
            dropout_threshold: Some(1),
        };
        let mut t = Termination::new(&config);
        // Iteration cap is checked before the timeout
        assert_eq!(t.observe(2, Duration::from_secs(1), 5.0), Tick::Stop(StopReason::MaxIterations));

        let mut t = Termination::new(&config);
        assert_eq!(t.observe(1, Duration::from_secs(1), 5.0), Tick::Stop(StopReason::Timeout));
    }

    #[test]
    fn test_stagnation_counter_resets_on_improvement() {
        let config = RunConfig {
            max_iterations: None,
            timeout_secs: None,
            dropout_threshold: Some(2),
        };
        let mut t = Termination::new(&config);
        let zero = Duration::ZERO;
        assert_eq!(t.observe(1, zero, 1000.0), Tick::Continue);
        assert_eq!(t.observe(2, zero, 1000.0), Tick::Continue);
        assert_eq!(t.stagnant(), 1);
        assert_eq!(t.observe(3, zero, 2000.0), Tick::Continue);
        assert_eq!(t.stagnant(), 0);
        assert_eq!(t.observe(4, zero, 2000.0), Tick::Continue);
        assert_eq!(t.observe(5, zero, 2000.0), Tick::Stop(StopReason::Stagnation));
    }

    #[test]
    fn test_max_iterations_stops_exactly() {
        let controller = RunController::new(RunConfig {
            max_iterations: Some(7),
            timeout_secs: None,
            dropout_threshold: None,
        })
        .unwrap();
        let mut engine = engine(1);
        let outcome = controller.run(&mut engine).unwrap();

        assert_eq!(outcome.reason, StopReason::MaxIterations);
        assert_eq!(outcome.iterations, 7);
        assert_eq!(outcome.solution.history.len(), 7);
    }

    #[test]
    fn test_iteration_cap_counts_only_the_current_run() {
        let mut engine = engine(5);
        for _ in 0..3 {
            engine.step().unwrap();
        }

        let controller = RunController::new(RunConfig {
            max_iterations: Some(2),
            timeout_secs: None,
            dropout_threshold: Some(25),
        })
        .unwrap();
        let outcome = controller.run(&mut engine).unwrap();
        assert_eq!(outcome.reason, StopReason::MaxIterations);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(engine.history().len(), 5);

        // A second run on the same engine is capped again
        let outcome = controller.run(&mut engine).unwrap();
        assert_eq!(outcome.iterations, 2);
        assert_eq!(engine.history().len(), 7);
    }

    #[test]
    fn test_cap_fires_once_exceeded() {
        let config = RunConfig {
            max_iterations: Some(2),
            timeout_secs: None,
            dropout_threshold: None,
        };
        let mut t = Termination::new(&config);
        assert_eq!(t.observe(3, Duration::ZERO, 1.0), Tick::Stop(StopReason::MaxIterations));
    }

    #[test]
    fn test_progress_callback_sees_every_iteration() {
        let controller = RunController::new(RunConfig {
            max_iterations: Some(4),
            ..Default::default()
        })
        .unwrap();
        let mut engine = engine(2);
        let mut seen = Vec::new();
        let outcome = controller.run_with_progress(&mut engine, |n| seen.push(n)).unwrap();

        let expected: Vec<usize> = (1..=outcome.iterations).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_zero_timeout_stops_after_one_iteration() {
        let controller = RunController::new(RunConfig {
            max_iterations: None,
            timeout_secs: Some(0.0),
            dropout_threshold: None,
        })
        .unwrap();
        let mut engine = engine(3);
        let outcome = controller.run(&mut engine).unwrap();
        assert_eq!(outcome.reason, StopReason::Timeout);
        assert_eq!(outcome.iterations, 1);
    }

    #[test]
    fn test_engine_errors_abort_the_run() {
        use crate::aco::DegeneratePolicy;
        use crate::matrix::Matrix;

        let costs = Matrix::from_rows(vec![vec![-1, 2], vec![2, -1]]).unwrap();
        let mut engine = AcoEngine::new(
            costs,
            AcoParams {
                evaporation_rate: 1.0,
                pheromone_floor: 0.0,
                degenerate_policy: DegeneratePolicy::Fail,
                seed: Some(4),
                ..Default::default()
            },
        )
        .unwrap();
        // Full evaporation with a zero floor leaves no desirable edge, so the
        // first ant of the first iteration stalls
        let controller = RunController::new(RunConfig {
            max_iterations: Some(10),
            timeout_secs: None,
            dropout_threshold: None,
        })
        .unwrap();
        engine.evaporate();
        let result = controller.run(&mut engine);
        assert!(matches!(result, Err(AcoError::ConstructionStalled { .. })));
    }
}
