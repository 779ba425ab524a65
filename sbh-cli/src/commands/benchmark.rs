//! Benchmark command implementation - sweep one parameter and record the
//! mean reconstruction error rate per value

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rand::Rng;
use sbh_core::instance::random_dna;
use sbh_core::{
    build_cost_matrix, error_rate, generate_instance, merge_path, AcoEngine, AcoParams, InstanceParams, RunController,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{rng_from_seed, write_json};
use crate::config::Config;
use crate::error::{CliError, CliResult};
use crate::BenchParam;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkPoint {
    pub value: f64,
    pub mean_error_rate: f64,
    pub error_rates: Vec<f64>,
    pub mean_iterations: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_at: DateTime<Utc>,
    pub param: String,
    pub sequences: usize,
    pub points: Vec<BenchmarkPoint>,
}

fn param_name(param: BenchParam) -> String {
    param
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_else(|| format!("{:?}", param))
}

fn whole_number(param: BenchParam, value: f64) -> CliResult<u32> {
    if value.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&value) {
        return Err(CliError::validation(format!(
            "{} takes whole non-negative values, got {}",
            param_name(param),
            value
        )));
    }
    Ok(value as u32)
}

/// Set the swept parameter to `value`
fn configure(param: BenchParam, value: f64, instance: &mut InstanceParams, aco: &mut AcoParams) -> CliResult<()> {
    match param {
        BenchParam::AntsRatio => aco.ants_ratio = value,
        BenchParam::Evaporation => aco.evaporation_rate = value,
        BenchParam::NegativeErrors => instance.negative_errors_percent = whole_number(param, value)?,
        BenchParam::K => instance.k = whole_number(param, value)? as usize,
    }
    aco.validate()?;
    instance.validate()?;
    Ok(())
}

/// One sequence per non-empty line
pub fn read_sequences(path: &Path) -> CliResult<Vec<String>> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('>'))
        .map(str::to_ascii_uppercase)
        .collect())
}

pub fn run_benchmark(
    config: &Config,
    param: BenchParam,
    values: &[f64],
    sequences: &[String],
    seeds: &[u64],
) -> Result<BenchmarkReport> {
    if sequences.is_empty() {
        return Err(CliError::validation("no sequences to benchmark on").into());
    }

    let controller = RunController::new(config.run.clone()).map_err(CliError::from)?;
    let mut points = Vec::with_capacity(values.len());

    for &value in values {
        let mut instance_params = config.instance.clone();
        let mut aco_params = config.aco.clone();
        configure(param, value, &mut instance_params, &mut aco_params)?;

        let mut error_rates = Vec::with_capacity(sequences.len());
        let mut iterations = 0usize;

        for (sequence, &seed) in sequences.iter().zip(seeds) {
            // Same seed per sequence across values, so only the parameter changes
            let mut rng = rng_from_seed(Some(seed));
            instance_params.dna_length = sequence.len();
            let spectrum =
                generate_instance(&instance_params, Some(sequence.as_str()), &mut rng).map_err(CliError::from)?;
            let reads = spectrum.reads().map_err(CliError::from)?;
            let costs = build_cost_matrix(&reads);

            let mut engine = AcoEngine::new(
                costs.clone(),
                AcoParams {
                    seed: Some(seed),
                    ..aco_params.clone()
                },
            )
            .map_err(CliError::from)?;
            let outcome = controller.run(&mut engine).map_err(CliError::from)?;
            iterations += outcome.iterations;

            let path = outcome
                .solution
                .path
                .ok_or_else(|| CliError::solver("the run finished without a path"))?;
            let merged = merge_path(&path, &reads, &costs);
            error_rates.push(error_rate(&merged.sequence, &spectrum.original_dna));
        }

        let runs = error_rates.len() as f64;
        let point = BenchmarkPoint {
            value,
            mean_error_rate: error_rates.iter().sum::<f64>() / runs,
            mean_iterations: iterations as f64 / runs,
            error_rates,
        };
        log::info!(
            "{} = {}: mean error rate {:.4} over {} runs",
            param_name(param),
            value,
            point.mean_error_rate,
            point.error_rates.len()
        );
        points.push(point);
    }

    Ok(BenchmarkReport {
        generated_at: Utc::now(),
        param: param_name(param),
        sequences: sequences.len(),
        points,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn execute(
    config: &Config,
    param: BenchParam,
    values: Vec<f64>,
    sequences: Option<PathBuf>,
    runs: usize,
    length: Option<usize>,
    k: Option<usize>,
    out: Option<PathBuf>,
) -> Result<()> {
    if values.is_empty() {
        return Err(CliError::validation("--values needs at least one value").into());
    }

    let mut config = config.clone();
    if let Some(k) = k {
        config.instance.k = k;
    }
    if let Some(length) = length {
        config.instance.dna_length = length;
    }

    let mut rng = rng_from_seed(config.general.seed);
    let sequences = match sequences {
        Some(path) => {
            let mut sequences = read_sequences(&path)?;
            if let Some(length) = length {
                sequences.retain(|s| s.len() >= length);
                sequences.iter_mut().for_each(|s| s.truncate(length));
            }
            log::info!("Loaded {} sequences from {}", sequences.len(), path.display());
            sequences
        }
        None => (0..runs).map(|_| random_dna(config.instance.dna_length, &mut rng)).collect(),
    };
    let seeds: Vec<u64> = sequences.iter().map(|_| rng.gen()).collect();

    log::info!(
        "Benchmarking {} over {} values on {} sequences",
        param_name(param),
        values.len(),
        sequences.len()
    );
    let report = run_benchmark(&config, param, &values, &sequences, &seeds)?;

    println!("{:>16} {:>16} {:>16}", report.param, "mean error rate", "mean iterations");
    for point in &report.points {
        println!(
            "{:>16} {:>16.4} {:>16.1}",
            point.value, point.mean_error_rate, point.mean_iterations
        );
    }

    if let Some(path) = out {
        write_json(&path, &report).with_context(|| format!("Failed to write results: {}", path.display()))?;
        log::info!("Results written to: {}", path.display());
    }

    Ok(())
}
