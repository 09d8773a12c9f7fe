//! Tileset files: a JSON object with the tileset extent and a map from
//! `"zoom.position"` tile ids to arrays of positional rows. Files ending in
//! `.gz` are read through gzip.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::rows::{decode_rows, encode_row, DecodeReport};
use crate::error::TilesetError;
use crate::types::{Feature, TileId, TilesetInfo};

#[derive(Debug, Deserialize, Serialize)]
struct TilesetFile {
    #[serde(flatten)]
    info: TilesetInfo,
    tiles: BTreeMap<String, Value>,
}

/// A decoded tileset: every tile's features, keyed by tile id.
#[derive(Debug, Clone)]
pub struct Tileset {
    pub info: TilesetInfo,
    pub tiles: BTreeMap<TileId, Vec<Feature>>,
    pub report: DecodeReport,
}

impl Tileset {
    pub fn new(info: TilesetInfo) -> Self {
        Self {
            info,
            tiles: BTreeMap::new(),
            report: DecodeReport::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, TilesetError> {
        let file: TilesetFile = serde_json::from_str(json)?;
        Self::from_file_repr(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TilesetError> {
        let file: TilesetFile = serde_json::from_reader(reader)?;
        Self::from_file_repr(file)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TilesetError> {
        let file = File::open(&path)?;
        let path_str = path.as_ref().to_string_lossy();

        if path_str.ends_with(".gz") {
            Self::from_reader(BufReader::new(GzDecoder::new(file)))
        } else {
            Self::from_reader(BufReader::new(file))
        }
    }

    fn from_file_repr(file: TilesetFile) -> Result<Self, TilesetError> {
        if file.info.max_pos <= file.info.min_pos {
            return Err(TilesetError::EmptyExtent {
                min_pos: file.info.min_pos,
                max_pos: file.info.max_pos,
            });
        }

        let mut tileset = Tileset::new(file.info);
        for (key, rows) in file.tiles {
            let id: TileId = key.parse()?;
            let rows = rows
                .as_array()
                .ok_or_else(|| TilesetError::InvalidTile(key.clone()))?;
            let (features, report) = decode_rows(id, rows);
            tileset.report.merge(&report);
            tileset.tiles.insert(id, features);
        }

        log::debug!(
            "decoded tileset: {} tiles, {} features, {} rows skipped",
            tileset.tiles.len(),
            tileset.report.decoded,
            tileset.report.skipped
        );
        Ok(tileset)
    }

    pub fn feature_count(&self) -> usize {
        self.tiles.values().map(Vec::len).sum()
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), TilesetError> {
        let tiles = self
            .tiles
            .iter()
            .map(|(id, features)| {
                (
                    id.to_string(),
                    Value::Array(features.iter().map(encode_row).collect()),
                )
            })
            .collect();
        let file = TilesetFile {
            info: self.info,
            tiles,
        };
        serde_json::to_writer(writer, &file)?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), TilesetError> {
        let file = File::create(&path)?;
        let path_str = path.as_ref().to_string_lossy();

        if path_str.ends_with(".gz") {
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            self.to_writer(&mut encoder)?;
            encoder.finish()?.flush()?;
        } else {
            let mut writer = BufWriter::new(file);
            self.to_writer(&mut writer)?;
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn sample_json() -> String {
        json!({
            "min_pos": 0,
            "max_pos": 4096,
            "max_zoom": 2,
            "tiles": {
                "0.0": [
                    ["chr1", 100, 900, "A", 10, "+", "", "", "", "", 0, 0, "100,500,", "200,900,", 0],
                    ["chr1", "x", 900, "BAD", 10, "+", "", "", "", "", 0, 0, "", "", 0]
                ],
                "1.1": [
                    ["chr2", 10, 90, "B", 3, "-", "", "", "", "", 0, 0, [], [], 2048]
                ]
            }
        })
        .to_string()
    }

    #[test]
    fn parses_tiles_and_counts_skips() {
        let ts = Tileset::from_json_str(&sample_json()).unwrap();
        assert_eq!(ts.info.max_zoom, 2);
        assert_eq!(ts.info.tile_px, 256.0);
        assert_eq!(ts.tiles.len(), 2);
        assert_eq!(ts.tiles[&TileId::new(0, 0)].len(), 1);
        assert_eq!(ts.tiles[&TileId::new(1, 1)][0].genome_start(), 2058);
        assert_eq!(ts.report.skipped, 1);
        assert_eq!(ts.feature_count(), 2);
    }

    #[test]
    fn rejects_bad_tile_ids() {
        let json = json!({"min_pos": 0, "max_pos": 10, "max_zoom": 1, "tiles": {"zero": []}});
        assert!(matches!(
            Tileset::from_json_str(&json.to_string()),
            Err(TilesetError::InvalidTileId(_))
        ));
    }

    #[test]
    fn rejects_empty_extent() {
        let json = json!({"min_pos": 10, "max_pos": 10, "max_zoom": 1, "tiles": {}});
        assert!(matches!(
            Tileset::from_json_str(&json.to_string()),
            Err(TilesetError::EmptyExtent { .. })
        ));
    }

    #[test]
    fn gzip_file_roundtrip() {
        let ts = Tileset::from_json_str(&sample_json()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.json.gz");
        ts.write_to_path(&path).unwrap();
        let back = Tileset::from_path(&path).unwrap();
        assert_eq!(back.tiles, ts.tiles);
    }

    #[test]
    fn plain_file_read() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(sample_json().as_bytes()).unwrap();
        let ts = Tileset::from_path(f.path()).unwrap();
        assert_eq!(ts.feature_count(), 2);
    }
}
