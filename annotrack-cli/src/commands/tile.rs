//! Tile command implementation - build a multi-resolution tileset from BED annotations

use anyhow::{Context, Result};
use std::path::PathBuf;

use annotrack_core::build_tileset;
use annotrack_core::io::BedParser;

use super::{load_chrom_sizes, require_file};
use crate::config::Config;

pub fn execute(
    config: &Config,
    bed: PathBuf,
    chrom_sizes: PathBuf,
    output: PathBuf,
    max_zoom: Option<u8>,
    max_per_tile: Option<usize>,
) -> Result<()> {
    log::info!("Building tileset from {}", bed.display());
    require_file(&bed)?;
    let sizes = load_chrom_sizes(&chrom_sizes)?;

    let features = BedParser::parse_file(&bed, &sizes)
        .with_context(|| format!("Failed to parse BED file: {}", bed.display()))?;
    log::info!("Parsed {} features over {} chromosomes", features.len(), sizes.chroms.len());

    let mut build = config.tiles.build_config();
    if let Some(z) = max_zoom {
        build.max_zoom = z;
    }
    if let Some(n) = max_per_tile {
        build.max_per_tile = n;
    }

    let tileset = build_tileset(&features, 0, sizes.total_length, &build);
    tileset
        .write_to_path(&output)
        .with_context(|| format!("Failed to write tileset: {}", output.display()))?;

    log::info!(
        "Wrote {} tiles ({} feature rows, max zoom {}) to {}",
        tileset.tiles.len(),
        tileset.feature_count(),
        build.max_zoom,
        output.display()
    );
    Ok(())
}
