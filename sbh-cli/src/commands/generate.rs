//! Generate command implementation - build an instance file from a DNA sequence

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sbh_core::{generate_instance, InstanceParams, ReadSet, Spectrum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{rng_from_seed, write_json};
use crate::config::Config;
use crate::error::{CliError, CliResult};

/// On-disk instance: the read set plus whatever is known about its origin.
///
/// Only `reads` is required, so hand-written instances load as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceFile {
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub params: Option<InstanceParams>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub original_dna: Option<String>,
    #[serde(default)]
    pub negative_errors: usize,
    #[serde(default)]
    pub positive_errors: usize,
    pub reads: ReadSet,
}

impl InstanceFile {
    pub fn from_spectrum(spectrum: &Spectrum, params: &InstanceParams, seed: Option<u64>) -> CliResult<Self> {
        Ok(Self {
            generated_at: Some(Utc::now()),
            params: Some(params.clone()),
            seed,
            original_dna: Some(spectrum.original_dna.clone()),
            negative_errors: spectrum.negative_errors,
            positive_errors: spectrum.positive_errors,
            reads: spectrum.reads()?,
        })
    }

    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Err(CliError::file_not_found(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CliError::invalid_instance(path.display().to_string(), e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }
}

/// Read a DNA sequence from a plain or FASTA-style file; header lines are
/// skipped and the remaining lines concatenated
pub fn read_dna_file(path: &Path) -> CliResult<String> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .filter(|line| !line.starts_with('>'))
        .map(str::trim)
        .collect())
}

pub fn execute(
    config: &Config,
    length: Option<usize>,
    k: Option<usize>,
    negative: Option<u32>,
    positive: Option<u32>,
    dna: Option<PathBuf>,
    out: PathBuf,
) -> Result<()> {
    log::info!("Generating instance");

    let sequence = dna.as_deref().map(read_dna_file).transpose()?;

    let mut params = config.instance.clone();
    if let Some(k) = k {
        params.k = k;
    }
    if let Some(percent) = negative {
        params.negative_errors_percent = percent;
    }
    if let Some(percent) = positive {
        params.positive_errors_percent = percent;
    }
    params.dna_length = match (length, &sequence) {
        (Some(length), _) => length,
        (None, Some(sequence)) => sequence.len(),
        (None, None) => params.dna_length,
    };

    let seed = config.general.seed;
    let mut rng = rng_from_seed(seed);
    let spectrum = generate_instance(&params, sequence.as_deref(), &mut rng).map_err(CliError::from)?;

    log::info!(
        "Spectrum of {} reads (k = {}): {} negative errors, {} positive errors",
        spectrum.read_count(),
        params.k,
        spectrum.negative_errors,
        spectrum.positive_errors
    );

    let instance = InstanceFile::from_spectrum(&spectrum, &params, seed)?;
    instance
        .save(&out)
        .with_context(|| format!("Failed to write instance: {}", out.display()))?;

    log::info!("Instance written to: {}", out.display());
    Ok(())
}
