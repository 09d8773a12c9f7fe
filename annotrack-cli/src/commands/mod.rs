//! Command implementations for the annotrack CLI

pub mod config;
pub mod inspect;
pub mod render;
pub mod tile;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use annotrack_core::ChromSizes;

use crate::error::CliError;

pub(crate) fn require_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()).into());
    }
    Ok(())
}

pub(crate) fn load_chrom_sizes(path: &Path) -> Result<ChromSizes> {
    require_file(path)?;
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    ChromSizes::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to read chromosome sizes from {}", path.display()))
}
