//! Problem instance generation
//!
//! Builds the spectrum of a DNA sequence (every k-mer), removes duplicates,
//! then injects negative errors (missing reads) and positive errors (random
//! reads absent from the true spectrum).

use crate::types::{ReadSet, ReadSetError, NUCLEOTIDES};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid DNA base '{0}'")]
    InvalidBase(char),

    #[error("Cannot add {requested} positive errors: only {available} unused {k}-mers exist")]
    SpectrumSaturated { requested: usize, available: usize, k: usize },

    #[error("Read set error: {0}")]
    ReadSet(#[from] ReadSetError),
}

pub type InstanceResult<T> = Result<T, InstanceError>;

/// Parameters for generating a problem instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceParams {
    /// Length of the DNA sequence `n`
    pub dna_length: usize,
    /// Read length `k`
    pub k: usize,
    /// Missing reads, as a percentage of the spectrum size
    pub negative_errors_percent: u32,
    /// Spurious reads, as a percentage of the spectrum size
    pub positive_errors_percent: u32,
}

impl Default for InstanceParams {
    fn default() -> Self {
        Self {
            dna_length: 200,
            k: 9,
            negative_errors_percent: 0,
            positive_errors_percent: 0,
        }
    }
}

impl InstanceParams {
    pub fn validate(&self) -> InstanceResult<()> {
        if self.k < 2 {
            return Err(InstanceError::InvalidParams(format!("k must be at least 2, got {}", self.k)));
        }
        if self.dna_length < self.k {
            return Err(InstanceError::InvalidParams(format!(
                "DNA length {} is shorter than k = {}",
                self.dna_length, self.k
            )));
        }
        if self.negative_errors_percent > 100 {
            return Err(InstanceError::InvalidParams(format!(
                "negative error percentage must be at most 100, got {}",
                self.negative_errors_percent
            )));
        }
        Ok(())
    }
}

/// Uniformly random DNA sequence
pub fn random_dna<R: Rng + ?Sized>(length: usize, rng: &mut R) -> String {
    (0..length)
        .map(|_| NUCLEOTIDES[rng.gen_range(0..NUCLEOTIDES.len())] as char)
        .collect()
}

/// Spectrum of a DNA sequence with its error bookkeeping.
///
/// The anchor (first k-mer of the sequence) is kept apart; every other read
/// is stored in alphabetical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub original_dna: String,
    pub k: usize,
    anchor: String,
    others: BTreeSet<String>,
    /// Reads dropped because they occurred more than once
    pub duplicates: Vec<String>,
    pub negative_errors: usize,
    pub positive_errors: usize,
}

impl Spectrum {
    /// Every k-mer of `dna` with duplicates eliminated
    pub fn from_dna(dna: &str, k: usize) -> InstanceResult<Self> {
        if let Some(base) = dna.bytes().find(|b| !NUCLEOTIDES.contains(b)) {
            return Err(InstanceError::InvalidBase(base as char));
        }
        InstanceParams {
            dna_length: dna.len(),
            k,
            ..Default::default()
        }
        .validate()?;

        let anchor = dna[..k].to_string();
        let mut others = BTreeSet::new();
        let mut occurrences: Vec<&str> = (1..=dna.len() - k).map(|i| &dna[i..i + k]).collect();
        occurrences.sort_unstable();

        let mut duplicates = Vec::new();
        for read in occurrences {
            if read == anchor || !others.insert(read.to_string()) {
                duplicates.push(read.to_string());
            }
        }

        log::debug!(
            "Spectrum of {} bases, k = {}: {} unique reads, {} duplicates",
            dna.len(),
            k,
            others.len() + 1,
            duplicates.len()
        );

        Ok(Self {
            original_dna: dna.to_string(),
            k,
            anchor,
            others,
            negative_errors: duplicates.len(),
            duplicates,
            positive_errors: 0,
        })
    }

    /// Reads currently in the spectrum, anchor included
    pub fn read_count(&self) -> usize {
        self.others.len() + 1
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn contains(&self, read: &str) -> bool {
        read == self.anchor || self.others.contains(read)
    }

    /// Remove reads until `ceil(len * percent / 100)` are missing in total,
    /// counting eliminated duplicates. The anchor and reads that were
    /// duplicated are never removed; the rest go in alphabetical order.
    pub fn include_negative_errors(&mut self, percent: u32) {
        let total = ceil_percent(self.read_count(), percent);
        if self.duplicates.len() >= total {
            return;
        }
        self.negative_errors = total;

        let to_remove: Vec<String> = self
            .others
            .iter()
            .filter(|read| !self.duplicates.contains(*read))
            .take(total - self.duplicates.len())
            .cloned()
            .collect();

        for read in &to_remove {
            self.others.remove(read);
        }

        log::debug!("Negative errors: {} in total, {} reads removed", total, to_remove.len());
    }

    /// Add `ceil(len * percent / 100)` random reads not already present
    pub fn include_positive_errors<R: Rng + ?Sized>(&mut self, percent: u32, rng: &mut R) -> InstanceResult<()> {
        let count = ceil_percent(self.read_count(), percent);

        let space = u32::try_from(self.k)
            .ok()
            .and_then(|k| 4usize.checked_pow(k))
            .unwrap_or(usize::MAX);
        let available = space.saturating_sub(self.read_count());
        if count > available {
            return Err(InstanceError::SpectrumSaturated {
                requested: count,
                available,
                k: self.k,
            });
        }

        for _ in 0..count {
            loop {
                let candidate = random_dna(self.k, rng);
                if !self.contains(&candidate) {
                    self.others.insert(candidate);
                    break;
                }
            }
        }
        self.positive_errors = count;

        log::debug!("Positive errors: {} random reads added", count);
        Ok(())
    }

    /// Anchor first, then the remaining reads in alphabetical order
    pub fn reads(&self) -> InstanceResult<ReadSet> {
        let reads = std::iter::once(self.anchor.clone())
            .chain(self.others.iter().cloned())
            .collect();
        Ok(ReadSet::new(reads)?)
    }
}

fn ceil_percent(len: usize, percent: u32) -> usize {
    (len * percent as usize).div_ceil(100)
}

/// Build a full instance: spectrum of `dna` (random when absent, truncated to
/// `dna_length` otherwise), then negative and positive errors
pub fn generate_instance<R: Rng + ?Sized>(
    params: &InstanceParams,
    dna: Option<&str>,
    rng: &mut R,
) -> InstanceResult<Spectrum> {
    params.validate()?;

    let dna = match dna {
        Some(sequence) => {
            let sequence = sequence.trim();
            let prefix = sequence.get(..params.dna_length).ok_or_else(|| {
                InstanceError::InvalidParams(format!(
                    "sequence of length {} is shorter than the requested {}",
                    sequence.len(),
                    params.dna_length
                ))
            })?;
            prefix.to_ascii_uppercase()
        }
        None => random_dna(params.dna_length, rng),
    };

    let mut spectrum = Spectrum::from_dna(&dna, params.k)?;
    spectrum.include_negative_errors(params.negative_errors_percent);
    spectrum.include_positive_errors(params.positive_errors_percent, rng)?;
    Ok(spectrum)
}
