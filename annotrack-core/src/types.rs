use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::coords::to_genome_global;
use crate::error::TilesetError;

/// Chromosome-local or genome-global position in base pairs.
pub type GenomicPos = i64;
pub type ZoomLevel = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "+" => Some(Strand::Forward),
            "-" => Some(Strand::Reverse),
            _ => None,
        }
    }
}

impl From<Strand> for char {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// Identifier of a 1D tile: zoom level plus position index at that zoom.
///
/// Ordering is by zoom, then position, which gives a stable iteration order
/// over fetched tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId {
    pub zoom: ZoomLevel,
    pub position: u64,
}

impl TileId {
    pub fn new(zoom: ZoomLevel, position: u64) -> Self {
        Self { zoom, position }
    }

    /// The tile one zoom level coarser that covers this tile's span.
    pub fn parent(&self) -> Option<TileId> {
        if self.zoom == 0 {
            None
        } else {
            Some(TileId::new(self.zoom - 1, self.position / 2))
        }
    }

    /// Iterate over every ancestor, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = TileId> {
        std::iter::successors(self.parent(), |id| id.parent())
    }

    pub fn is_ancestor_of(&self, other: &TileId) -> bool {
        other.ancestors().any(|a| a == *self)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.zoom, self.position)
    }
}

impl FromStr for TileId {
    type Err = TilesetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TilesetError::InvalidTileId(s.to_string());
        let (zoom, position) = s.trim().split_once('.').ok_or_else(invalid)?;
        let zoom = zoom.parse::<ZoomLevel>().map_err(|_| invalid())?;
        let position = position.parse::<u64>().map_err(|_| invalid())?;
        if zoom < 64 && position >= (1u64 << zoom) {
            return Err(invalid());
        }
        Ok(TileId::new(zoom, position))
    }
}

/// Genome-global extent of a tileset and its zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TilesetInfo {
    pub min_pos: GenomicPos,
    pub max_pos: GenomicPos,
    pub max_zoom: ZoomLevel,
    /// Nominal on-screen width of one tile.
    #[serde(default = "default_tile_px")]
    pub tile_px: f64,
}

fn default_tile_px() -> f64 {
    256.0
}

impl TilesetInfo {
    pub fn new(min_pos: GenomicPos, max_pos: GenomicPos, max_zoom: ZoomLevel) -> Self {
        Self {
            min_pos,
            max_pos,
            max_zoom,
            tile_px: default_tile_px(),
        }
    }

    pub fn total_length(&self) -> f64 {
        (self.max_pos - self.min_pos).max(1) as f64
    }

    /// Genomic width of a single tile at `zoom`.
    pub fn tile_width(&self, zoom: ZoomLevel) -> f64 {
        self.total_length() / 2f64.powi(zoom as i32)
    }

    pub fn tiles_at(&self, zoom: ZoomLevel) -> u64 {
        1u64 << zoom.min(63)
    }

    /// Genome-global `[start, end)` covered by a tile.
    pub fn tile_span(&self, id: TileId) -> (f64, f64) {
        let width = self.tile_width(id.zoom);
        let start = self.min_pos as f64 + id.position as f64 * width;
        (start, start + width)
    }
}

/// One gene annotation record, decoded from a tile row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub chrom: String,
    pub chrom_local_start: GenomicPos,
    pub chrom_local_end: GenomicPos,
    pub name: String,
    pub importance: f64,
    pub strand: Strand,
    pub exon_starts: Vec<GenomicPos>,
    pub exon_ends: Vec<GenomicPos>,
    pub chrom_offset: GenomicPos,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Feature {
    pub fn genome_start(&self) -> GenomicPos {
        to_genome_global(self.chrom_local_start, self.chrom_offset)
    }

    pub fn genome_end(&self) -> GenomicPos {
        to_genome_global(self.chrom_local_end, self.chrom_offset)
    }

    pub fn genome_middle(&self) -> f64 {
        (self.genome_start() as f64 + self.genome_end() as f64) / 2.0
    }

    pub fn length(&self) -> GenomicPos {
        self.chrom_local_end - self.chrom_local_start
    }

    /// Exon spans in genome-global coordinates. Decoding guarantees both
    /// exon lists have the same length; features built in code should be
    /// checked with `exon_starts.len() == exon_ends.len()` first.
    pub fn genome_exons(&self) -> impl Iterator<Item = (GenomicPos, GenomicPos)> + '_ {
        self.exon_starts
            .iter()
            .zip(self.exon_ends.iter())
            .map(|(&start, &end)| {
                (
                    to_genome_global(start, self.chrom_offset),
                    to_genome_global(end, self.chrom_offset),
                )
            })
    }

    pub fn exon_count(&self) -> usize {
        self.exon_starts.len()
    }
}
