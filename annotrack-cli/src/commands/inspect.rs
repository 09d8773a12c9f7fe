//! Inspect command implementation - summarize a tileset

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use annotrack_core::{DecodeReport, Tileset, TilesetInfo, ZoomLevel};

use super::require_file;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ZoomSummary {
    tiles: usize,
    features: usize,
    max_importance: f64,
}

#[derive(Debug, Serialize)]
struct TilesetSummary {
    info: TilesetInfo,
    report: DecodeReport,
    zooms: BTreeMap<ZoomLevel, ZoomSummary>,
}

fn summarize(tileset: &Tileset) -> TilesetSummary {
    let mut zooms: BTreeMap<ZoomLevel, ZoomSummary> = BTreeMap::new();
    for (id, features) in &tileset.tiles {
        let entry = zooms.entry(id.zoom).or_insert(ZoomSummary {
            tiles: 0,
            features: 0,
            max_importance: 0.0,
        });
        entry.tiles += 1;
        entry.features += features.len();
        for f in features {
            entry.max_importance = entry.max_importance.max(f.importance);
        }
    }
    TilesetSummary {
        info: tileset.info,
        report: tileset.report.clone(),
        zooms,
    }
}

pub fn execute(path: PathBuf, json: bool) -> Result<()> {
    require_file(&path)?;
    let tileset = Tileset::from_path(&path).map_err(CliError::from)?;
    let summary = summarize(&tileset);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Tileset: {}", path.display());
    println!(
        "  extent: {}-{} ({} bp), max zoom {}, tile width {} px",
        summary.info.min_pos,
        summary.info.max_pos,
        summary.info.max_pos - summary.info.min_pos,
        summary.info.max_zoom,
        summary.info.tile_px
    );
    println!(
        "  rows: {} decoded, {} skipped, {} duplicate names",
        summary.report.decoded, summary.report.skipped, summary.report.duplicate_names
    );
    for (zoom, z) in &summary.zooms {
        println!(
            "  zoom {:>2}: {:>6} tiles {:>8} features  max importance {}",
            zoom, z.tiles, z.features, z.max_importance
        );
    }
    Ok(())
}
