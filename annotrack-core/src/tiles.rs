//! Builds multi-resolution gene annotation tilesets from a flat feature list.
//!
//! Every tile at every zoom keeps the most important features overlapping
//! its span, so coarse tiles show only the top genes and finer tiles fill in
//! the rest.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::io::Tileset;
use crate::types::{Feature, TileId, TilesetInfo, ZoomLevel};

#[derive(Debug, Clone)]
pub struct TileBuildConfig {
    pub max_zoom: ZoomLevel,
    /// Features kept per tile, chosen by importance.
    pub max_per_tile: usize,
    pub tile_px: f64,
}

impl Default for TileBuildConfig {
    fn default() -> Self {
        Self {
            max_zoom: 12,
            max_per_tile: 100,
            tile_px: 256.0,
        }
    }
}

fn by_importance(a: &Feature, b: &Feature) -> Ordering {
    b.importance
        .partial_cmp(&a.importance)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.name.cmp(&b.name))
}

pub fn build_tileset(features: &[Feature], min_pos: i64, max_pos: i64, config: &TileBuildConfig) -> Tileset {
    let mut info = TilesetInfo::new(min_pos, max_pos.max(min_pos + 1), config.max_zoom);
    info.tile_px = config.tile_px;

    let mut ranked: Vec<&Feature> = features.iter().collect();
    ranked.sort_by(|a, b| by_importance(a, b));

    let mut tiles: BTreeMap<TileId, Vec<Feature>> = BTreeMap::new();
    for zoom in 0..=config.max_zoom {
        let width = info.tile_width(zoom);
        let last = info.tiles_at(zoom) - 1;
        let mut per_tile: HashMap<u64, Vec<&Feature>> = HashMap::new();

        for feature in &ranked {
            let start = ((feature.genome_start() - info.min_pos) as f64 / width).floor();
            let end = ((feature.genome_end() - info.min_pos) as f64 / width).floor();
            if end < 0.0 || start > last as f64 {
                continue;
            }
            let first = start.max(0.0) as u64;
            let final_pos = (end as u64).min(last);
            for pos in first..=final_pos {
                let bucket = per_tile.entry(pos).or_default();
                if bucket.len() < config.max_per_tile && !bucket.iter().any(|f| f.name == feature.name) {
                    bucket.push(feature);
                }
            }
        }

        for (pos, mut bucket) in per_tile {
            bucket.sort_by_key(|f| f.genome_start());
            tiles.insert(
                TileId::new(zoom, pos),
                bucket.into_iter().cloned().collect(),
            );
        }
    }

    let mut tileset = Tileset::new(info);
    tileset.report.decoded = tiles.values().map(Vec::len).sum();
    tileset.tiles = tiles;
    log::debug!(
        "built {} tiles over {} features (max zoom {})",
        tileset.tiles.len(),
        features.len(),
        config.max_zoom
    );
    tileset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Strand;

    fn feature(name: &str, start: i64, end: i64, importance: f64) -> Feature {
        Feature {
            chrom: "chr1".into(),
            chrom_local_start: start,
            chrom_local_end: end,
            name: name.into(),
            importance,
            strand: Strand::Forward,
            exon_starts: vec![start],
            exon_ends: vec![end],
            chrom_offset: 0,
            transcript_id: None,
            gene_id: None,
            gene_type: None,
            description: None,
        }
    }

    #[test]
    fn coarse_tiles_keep_most_important() {
        let features = vec![
            feature("low", 10, 20, 1.0),
            feature("high", 600, 700, 50.0),
            feature("mid", 300, 310, 5.0),
        ];
        let config = TileBuildConfig {
            max_zoom: 1,
            max_per_tile: 1,
            tile_px: 256.0,
        };
        let ts = build_tileset(&features, 0, 1024, &config);
        let root = &ts.tiles[&TileId::new(0, 0)];
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].name, "high");
        assert_eq!(ts.tiles[&TileId::new(1, 0)][0].name, "mid");
        assert_eq!(ts.tiles[&TileId::new(1, 1)][0].name, "high");
    }

    #[test]
    fn spanning_features_appear_in_each_tile() {
        let features = vec![feature("long", 400, 700, 1.0)];
        let config = TileBuildConfig {
            max_zoom: 1,
            ..Default::default()
        };
        let ts = build_tileset(&features, 0, 1024, &config);
        assert_eq!(ts.tiles[&TileId::new(1, 0)][0].name, "long");
        assert_eq!(ts.tiles[&TileId::new(1, 1)][0].name, "long");
    }
}
