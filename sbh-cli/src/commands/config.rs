//! Config command implementation - print or write sbh.toml

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;

pub fn execute(config: &Config, example: bool, write: Option<PathBuf>) -> Result<()> {
    if example {
        println!("{}", Config::example_toml()?);
        return Ok(());
    }

    match write {
        Some(path) => {
            config.save_to_file(&path)?;
            log::info!("Configuration written to: {}", path.display());
        }
        None => {
            let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
            println!("{}", content);
        }
    }

    Ok(())
}
