//! Error handling for the SBH-ACO CLI

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid instance in {file}: {message}")]
    InvalidInstance { file: String, message: String },

    #[error("Solver error: {message}")]
    Solver { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn invalid_instance<S: Into<String>>(file: S, message: S) -> Self {
        Self::InvalidInstance {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn solver<S: Into<String>>(message: S) -> Self {
        Self::Solver { message: message.into() }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into() }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<sbh_core::AcoError> for CliError {
    fn from(err: sbh_core::AcoError) -> Self {
        Self::solver(err.to_string())
    }
}

impl From<sbh_core::InstanceError> for CliError {
    fn from(err: sbh_core::InstanceError) -> Self {
        Self::validation(err.to_string())
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file\n\
                 • Create an instance first with 'sbh generate --out <FILE>'",
                path.display()
            ));
        }

        CliError::InvalidInstance { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Instance files are JSON with a \"reads\" array of equal-length A/C/G/T strings\n\
                 • The first read is the anchor and reads must be distinct\n\
                 • Regenerate the instance with 'sbh generate'",
            );
        }

        CliError::Solver { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check the [aco] and [run] sections of sbh.toml\n\
                 • Set at least one stop condition (max_iterations, timeout_secs or dropout_threshold)\n\
                 • A zero pheromone floor with full evaporation leaves no edge to follow",
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your sbh.toml configuration file\n\
                 • Use 'sbh config --example' to generate a sample configuration\n\
                 • Verify that all configuration values are valid",
            );
        }

        CliError::Validation { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Read length k must be at least 2 and no longer than the sequence\n\
                 • Error percentages are whole numbers, negative errors at most 100",
            );
        }

        CliError::Io { .. } => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}
