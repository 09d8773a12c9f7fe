//! Config command implementation - print or write annotrack.toml

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;

pub fn execute(config: &Config, example: bool, output: Option<PathBuf>) -> Result<()> {
    let effective = if example { Config::default() } else { config.clone() };

    match output {
        Some(path) => {
            effective.save_to_file(&path)?;
            log::info!("Configuration written to {}", path.display());
        }
        None if example => print!("{}", Config::example_toml()?),
        None => print!("{}", toml::to_string_pretty(&effective)?),
    }
    Ok(())
}
