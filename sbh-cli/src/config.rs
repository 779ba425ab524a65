//! Configuration handling for the SBH-ACO CLI
//!
//! Supports loading configuration from sbh.toml files with CLI argument overrides.

use crate::error::CliError;
use anyhow::{Context, Result};
use sbh_core::{AcoParams, InstanceParams, RunConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub aco: AcoParams,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub instance: InstanceParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Seed for reproducible runs; entropy-seeded when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Default number of threads to use
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_threads() -> usize { num_cpus::get() }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            seed: None,
            threads: default_threads(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            aco: AcoParams::default(),
            run: RunConfig::default(),
            instance: InstanceParams::default(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from("sbh.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: sbh.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.threads == 0 {
            return Err(CliError::config("general.threads must be at least 1").into());
        }
        self.aco.validate().context("Invalid [aco] section")?;
        self.run.validate().context("Invalid [run] section")?;
        self.instance.validate().context("Invalid [instance] section")?;
        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbh_core::EdgeOrientation;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.seed, None);
        assert!(config.general.threads >= 1);
        assert_eq!(config.aco.alpha, 5.0);
        assert_eq!(config.run.dropout_threshold, Some(3));
        assert_eq!(config.instance.k, 9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let mut config = Config::default();
        config.general.seed = Some(11);
        config.aco.weights.orientation = EdgeOrientation::Outgoing;
        config.run.max_iterations = Some(40);

        let temp_file = NamedTempFile::new()?;
        config.save_to_file(temp_file.path())?;
        let loaded = Config::load_from_file(temp_file.path())?;

        assert_eq!(config, loaded);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[aco]\nevaporation_rate = 0.25\n\n[instance]\nk = 7")?;

        let config = Config::load(Some(file.path()))?;
        assert_eq!(config.aco.evaporation_rate, 0.25);
        assert_eq!(config.aco.q, 1000.0);
        assert_eq!(config.instance.k, 7);
        assert_eq!(config.instance.dna_length, 200);
        assert_eq!(config.run, RunConfig::default());
        Ok(())
    }

    #[test]
    fn test_invalid_values_rejected() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[aco]\nevaporation_rate = 1.5")?;
        assert!(Config::load_from_file(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_example_toml_generation() -> Result<()> {
        let example = Config::example_toml()?;
        assert!(example.contains("[general]"));
        assert!(example.contains("[aco]"));
        assert!(example.contains("[run]"));
        assert!(example.contains("[instance]"));
        Ok(())
    }
}
