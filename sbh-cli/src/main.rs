use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use config::Config;
use sbh_core::EdgeOrientation;

#[derive(Parser)]
#[command(name = "sbh")]
#[command(about = "SBH-ACO - DNA sequencing by hybridization with ant colony optimisation")]
#[command(version)]
#[command(long_about = "
SBH-ACO orders the reads of an error-prone hybridization spectrum so that
consecutive reads overlap as much as possible, then merges them back into a
DNA sequence.

Examples:
  sbh generate --length 200 --k 9 --negative 2 --positive 2 --out instance.json
  sbh solve --instance instance.json --out report.json
  sbh solve --instance instance.json --algorithm greedy
  sbh benchmark --param evaporation --values 0.05,0.1,0.2 --runs 5
  sbh config --example > sbh.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Seed for reproducible runs
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a problem instance from a random or given DNA sequence
    Generate {
        /// Length of the DNA sequence
        #[arg(long)]
        length: Option<usize>,

        /// Read length
        #[arg(short, long)]
        k: Option<usize>,

        /// Negative errors (missing reads) in percent
        #[arg(long)]
        negative: Option<u32>,

        /// Positive errors (spurious reads) in percent
        #[arg(long)]
        positive: Option<u32>,

        /// File holding the DNA sequence to use instead of a random one
        #[arg(long)]
        dna: Option<PathBuf>,

        /// Output instance file (JSON)
        #[arg(short, long, required = true)]
        out: PathBuf,
    },

    /// Order the reads of an instance and reconstruct the sequence
    Solve {
        /// Instance file (JSON)
        #[arg(short, long, required = true)]
        instance: PathBuf,

        /// Reconstruction algorithm
        #[arg(long, default_value = "aco")]
        algorithm: Algorithm,

        /// Ants per iteration as a fraction of the read count
        #[arg(long)]
        ants_ratio: Option<f64>,

        /// Pheromone exponent
        #[arg(long)]
        alpha: Option<f64>,

        /// Visibility exponent
        #[arg(long)]
        beta: Option<f64>,

        /// Evaporation rate in [0, 1]
        #[arg(long)]
        evaporation: Option<f64>,

        /// Matrix entry read as the shift of a consecutive pair
        #[arg(long)]
        orientation: Option<Orientation>,

        /// Stop after this many iterations
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Wall-clock limit in seconds
        #[arg(long)]
        timeout: Option<f64>,

        /// Consecutive non-improving iterations before stopping
        #[arg(long)]
        dropout: Option<usize>,

        /// Report file (JSON); printed to stdout when absent
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Sweep one ACO or instance parameter and report the mean error rate
    Benchmark {
        /// Parameter to vary
        #[arg(long, required = true)]
        param: BenchParam,

        /// Comma-separated values of the parameter
        #[arg(long, required = true, value_delimiter = ',')]
        values: Vec<f64>,

        /// File with one DNA sequence per line; random sequences when absent
        #[arg(long)]
        sequences: Option<PathBuf>,

        /// Number of random sequences per value
        #[arg(long, default_value = "3")]
        runs: usize,

        /// Length of the DNA sequences
        #[arg(long)]
        length: Option<usize>,

        /// Read length
        #[arg(short, long)]
        k: Option<usize>,

        /// Results file (JSON)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print or write the configuration file
    Config {
        /// Print the default configuration
        #[arg(long, conflicts_with = "write")]
        example: bool,

        /// Write the effective configuration to this path
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Aco,
    Greedy,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Incoming,
    Outgoing,
}

impl From<Orientation> for EdgeOrientation {
    fn from(value: Orientation) -> Self {
        match value {
            Orientation::Incoming => EdgeOrientation::Incoming,
            Orientation::Outgoing => EdgeOrientation::Outgoing,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BenchParam {
    AntsRatio,
    Evaporation,
    NegativeErrors,
    K,
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .try_init()
        .context("Failed to initialise logging")?;

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.quiet)?;

    let mut config = Config::load(cli.config.as_deref())?;
    if cli.seed.is_some() {
        config.general.seed = cli.seed;
    }

    let threads = cli.threads.unwrap_or(config.general.threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to set thread count")?;
    log::debug!("Using {} worker threads", threads);

    match cli.command {
        Commands::Generate {
            length,
            k,
            negative,
            positive,
            dna,
            out,
        } => {
            commands::generate::execute(&config, length, k, negative, positive, dna, out)?;
        }

        Commands::Solve {
            instance,
            algorithm,
            ants_ratio,
            alpha,
            beta,
            evaporation,
            orientation,
            max_iterations,
            timeout,
            dropout,
            out,
        } => {
            let overrides = commands::solve::Overrides {
                ants_ratio,
                alpha,
                beta,
                evaporation,
                orientation: orientation.map(Into::into),
                max_iterations,
                timeout,
                dropout,
            };
            commands::solve::execute(&config, instance, algorithm, overrides, out, cli.quiet)?;
        }

        Commands::Benchmark {
            param,
            values,
            sequences,
            runs,
            length,
            k,
            out,
        } => {
            commands::benchmark::execute(&config, param, values, sequences, runs, length, k, out)?;
        }

        Commands::Config { example, write } => {
            commands::config::execute(&config, example, write)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        match err.downcast_ref::<error::CliError>() {
            Some(cli_err) => error::print_error_and_exit(cli_err),
            None => {
                eprintln!("Error: {:#}", err);
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_benchmark_values() {
        let cli = Cli::parse_from([
            "sbh",
            "--seed",
            "7",
            "benchmark",
            "--param",
            "ants-ratio",
            "--values",
            "0.25,0.5,1",
        ]);
        assert_eq!(cli.seed, Some(7));
        match cli.command {
            Commands::Benchmark { param, values, runs, .. } => {
                assert_eq!(param, BenchParam::AntsRatio);
                assert_eq!(values, vec![0.25, 0.5, 1.0]);
                assert_eq!(runs, 3);
            }
            _ => panic!("expected benchmark command"),
        }
    }

    #[test]
    fn test_parse_solve_overrides() {
        let cli = Cli::parse_from([
            "sbh",
            "solve",
            "--instance",
            "instance.json",
            "--algorithm",
            "greedy",
            "--orientation",
            "outgoing",
            "-v",
            "-v",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Solve {
                algorithm, orientation, ..
            } => {
                assert_eq!(algorithm, Algorithm::Greedy);
                assert_eq!(orientation.map(EdgeOrientation::from), Some(EdgeOrientation::Outgoing));
            }
            _ => panic!("expected solve command"),
        }
    }
}
