//! Solve command implementation - order an instance's reads and reconstruct the sequence

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use sbh_core::{
    build_cost_matrix, error_rate, evaluate, greedy_path, merge_path, AcoEngine, AcoParams, EdgeOrientation,
    GreedyParams, PathScore, RunConfig, RunController, StopReason,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::generate::InstanceFile;
use super::write_json;
use crate::config::Config;
use crate::error::CliError;
use crate::Algorithm;

/// Command-line overrides of the `[aco]` and `[run]` sections
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub ants_ratio: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub evaporation: Option<f64>,
    pub orientation: Option<EdgeOrientation>,
    pub max_iterations: Option<usize>,
    pub timeout: Option<f64>,
    pub dropout: Option<usize>,
}

impl Overrides {
    pub fn apply(&self, aco: &mut AcoParams, run: &mut RunConfig) {
        if let Some(v) = self.ants_ratio {
            aco.ants_ratio = v;
        }
        if let Some(v) = self.alpha {
            aco.alpha = v;
        }
        if let Some(v) = self.beta {
            aco.beta = v;
        }
        if let Some(v) = self.evaporation {
            aco.evaporation_rate = v;
        }
        if let Some(v) = self.orientation {
            aco.weights.orientation = v;
        }
        if self.max_iterations.is_some() {
            run.max_iterations = self.max_iterations;
        }
        if self.timeout.is_some() {
            run.timeout_secs = self.timeout;
        }
        if self.dropout.is_some() {
            run.dropout_threshold = self.dropout;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub stop_reason: StopReason,
    pub iterations: usize,
    pub elapsed_secs: f64,
    /// Best score of each iteration
    pub history: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    pub generated_at: DateTime<Utc>,
    pub algorithm: String,
    pub reads: usize,
    pub read_length: usize,
    pub path: Vec<usize>,
    pub score: PathScore,
    pub sequence: String,
    /// Edit distance to the original sequence over its length, when known
    pub error_rate: Option<f64>,
    pub run: Option<RunSummary>,
}

pub fn solve_instance(
    config: &Config,
    instance: &InstanceFile,
    algorithm: Algorithm,
    overrides: &Overrides,
    progress: &ProgressBar,
) -> Result<SolveReport> {
    let reads = &instance.reads;
    let costs = build_cost_matrix(reads);

    let mut params = config.aco.clone();
    let mut run_config = config.run.clone();
    overrides.apply(&mut params, &mut run_config);
    if config.general.seed.is_some() {
        params.seed = config.general.seed;
    }
    let weights = params.weights;

    let (path, run) = match algorithm {
        Algorithm::Aco => {
            let mut engine = AcoEngine::new(costs.clone(), params).map_err(CliError::from)?;
            let controller = RunController::new(run_config).map_err(CliError::from)?;
            log::info!(
                "Running ACO on {} reads with {} ants per iteration",
                reads.len(),
                engine.ants_count()
            );

            let outcome = controller
                .run_with_progress(&mut engine, |iteration| {
                    progress.set_message(format!("iteration {}", iteration));
                })
                .map_err(CliError::from)?;

            let path = outcome
                .solution
                .path
                .clone()
                .ok_or_else(|| CliError::solver("the run finished without a path"))?;
            let summary = RunSummary {
                stop_reason: outcome.reason,
                iterations: outcome.iterations,
                elapsed_secs: outcome.elapsed_secs,
                history: outcome.solution.history,
            };
            (path, Some(summary))
        }
        Algorithm::Greedy => {
            let greedy = GreedyParams {
                target_length: instance.original_dna.as_ref().map(String::len),
                ..Default::default()
            };
            log::info!("Running greedy reconstruction on {} reads", reads.len());
            (greedy_path(&costs, reads.read_len(), &greedy), None)
        }
    };

    let score = evaluate(&path, &costs, &weights);
    let merged = merge_path(&path, reads, &costs);
    let error_rate = instance
        .original_dna
        .as_deref()
        .map(|original| error_rate(&merged.sequence, original));

    log::info!(
        "Path of {} reads: fitness {:.1}, {} perfect overlaps, sequence length {}",
        path.len(),
        score.fitness,
        score.perfect,
        merged.sequence.len()
    );
    if let Some(rate) = error_rate {
        log::info!("Error rate against the original sequence: {:.4}", rate);
    }

    Ok(SolveReport {
        generated_at: Utc::now(),
        algorithm: format!("{:?}", algorithm).to_lowercase(),
        reads: reads.len(),
        read_length: reads.read_len(),
        path,
        score,
        sequence: merged.sequence,
        error_rate,
        run,
    })
}

fn spinner(quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner} [{elapsed}] {msg}").context("Invalid progress template")?);
    bar.enable_steady_tick(Duration::from_millis(120));
    Ok(bar)
}

pub fn execute(
    config: &Config,
    instance: PathBuf,
    algorithm: Algorithm,
    overrides: Overrides,
    out: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    log::info!("Loading instance: {}", instance.display());
    let instance = InstanceFile::load(&instance)?;

    let progress = spinner(quiet)?;
    let report = solve_instance(config, &instance, algorithm, &overrides, &progress);
    progress.finish_and_clear();
    let report = report?;

    match out {
        Some(path) => {
            write_json(&path, &report)?;
            log::info!("Report written to: {}", path.display());
        }
        None => {
            let content = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{}", content);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbh_core::ReadSet;
    use tempfile::tempdir;

    fn rotation_instance() -> InstanceFile {
        InstanceFile {
            generated_at: None,
            params: None,
            seed: None,
            original_dna: Some("ACGTACG".to_string()),
            negative_errors: 0,
            positive_errors: 0,
            reads: ReadSet::new(["ACGT", "CGTA", "GTAC", "TACG"].iter().map(|s| s.to_string()).collect())
                .expect("valid reads"),
        }
    }

    fn seeded_config() -> Config {
        let mut config = Config::default();
        config.general.seed = Some(17);
        config
    }

    #[test]
    fn test_overrides_apply() {
        let mut aco = AcoParams::default();
        let mut run = RunConfig::default();
        let overrides = Overrides {
            evaporation: Some(0.3),
            orientation: Some(EdgeOrientation::Outgoing),
            max_iterations: Some(9),
            ..Default::default()
        };
        overrides.apply(&mut aco, &mut run);

        assert_eq!(aco.evaporation_rate, 0.3);
        assert_eq!(aco.alpha, 5.0);
        assert_eq!(aco.weights.orientation, EdgeOrientation::Outgoing);
        assert_eq!(run.max_iterations, Some(9));
        assert_eq!(run.dropout_threshold, Some(3));
    }

    #[test]
    fn test_solve_with_aco() -> Result<()> {
        let overrides = Overrides {
            orientation: Some(EdgeOrientation::Outgoing),
            max_iterations: Some(20),
            ..Default::default()
        };
        let report = solve_instance(
            &seeded_config(),
            &rotation_instance(),
            Algorithm::Aco,
            &overrides,
            &ProgressBar::hidden(),
        )?;

        assert_eq!(report.path[0], 0);
        assert_eq!(report.path.len(), 4);
        let run = report.run.expect("run summary");
        assert_eq!(run.history.len(), run.iterations);
        assert!(report.error_rate.is_some());
        Ok(())
    }

    #[test]
    fn test_solve_with_greedy() -> Result<()> {
        let overrides = Overrides {
            orientation: Some(EdgeOrientation::Outgoing),
            ..Default::default()
        };
        let report = solve_instance(
            &Config::default(),
            &rotation_instance(),
            Algorithm::Greedy,
            &overrides,
            &ProgressBar::hidden(),
        )?;

        assert_eq!(report.path, vec![0, 1, 2, 3]);
        assert_eq!(report.sequence, "ACGTACG");
        assert_eq!(report.score.perfect, 3);
        assert_eq!(report.error_rate, Some(0.0));
        assert!(report.run.is_none());
        Ok(())
    }

    #[test]
    fn test_execute_writes_report() -> Result<()> {
        let dir = tempdir()?;
        let instance_path = dir.path().join("instance.json");
        let report_path = dir.path().join("report.json");
        rotation_instance().save(&instance_path)?;

        let overrides = Overrides {
            max_iterations: Some(5),
            ..Default::default()
        };
        execute(
            &seeded_config(),
            instance_path,
            Algorithm::Aco,
            overrides,
            Some(report_path.clone()),
            true,
        )?;

        let content = std::fs::read_to_string(&report_path)?;
        let report: SolveReport = serde_json::from_str(&content)?;
        assert_eq!(report.algorithm, "aco");
        assert_eq!(report.reads, 4);
        Ok(())
    }
}
