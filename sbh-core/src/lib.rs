//! SBH-ACO Core Library
//!
//! Overlap model, ant colony engine and run controller for reconstructing DNA
//! from an error-prone hybridization spectrum, plus the instance generator,
//! greedy baseline and assembly metrics used around it.

pub mod types;
pub mod matrix;
pub mod overlap;
pub mod score;
pub mod aco;
pub mod run;
pub mod greedy;
pub mod instance;
pub mod assembly;

// Re-export commonly used types and functions
pub use types::{ReadSet, ReadSetError, NUCLEOTIDES};
pub use matrix::{Matrix, MatrixError};
pub use overlap::{build_cost_matrix, overlap_shift, CostMatrix};
pub use score::{evaluate, score, EdgeOrientation, PathScore, ScoreWeights};
pub use aco::{AcoEngine, AcoError, AcoParams, AcoResult, DegeneratePolicy, IterationSummary, Solution};
pub use run::{RunConfig, RunController, RunOutcome, StopReason};
pub use greedy::{greedy_path, GreedyParams};
pub use instance::{generate_instance, InstanceError, InstanceParams, Spectrum};
pub use assembly::{error_rate, levenshtein, merge_path, MergedSequence};

/// Version information for the SBH-ACO core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
