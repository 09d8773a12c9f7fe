//! Error types for tile decoding and scale construction.

use thiserror::Error;

/// A single malformed annotation row. Rows are rejected individually; the
/// rest of the tile still decodes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeatureError {
    #[error("row is not an array")]
    NotAnArray,
    #[error("insufficient fields (expected at least {expected}, got {got})")]
    InsufficientFields { expected: usize, got: usize },
    #[error("field {field} is not numeric: {value}")]
    NonNumeric { field: &'static str, value: String },
    #[error("field {field} is not a string")]
    NotAString { field: &'static str },
    #[error("invalid strand: {0}")]
    InvalidStrand(String),
    #[error("importance must be finite and non-negative, got {0}")]
    InvalidImportance(f64),
    #[error("exon starts/ends length mismatch ({starts} starts, {ends} ends)")]
    ExonCountMismatch { starts: usize, ends: usize },
    #[error("exon {index} ends before it starts ({start} > {end})")]
    InvertedExon { index: usize, start: i64, end: i64 },
    #[error("feature ends before it starts ({start} > {end})")]
    InvertedSpan { start: i64, end: i64 },
    #[error("empty feature name")]
    EmptyName,
}

#[derive(Debug, Error)]
pub enum TilesetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tile id: {0}")]
    InvalidTileId(String),
    #[error("tile {0} is not an array of rows")]
    InvalidTile(String),
    #[error("tileset extent is empty ({min_pos}..{max_pos})")]
    EmptyExtent { min_pos: i64, max_pos: i64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScaleError {
    #[error("log scale domain must be strictly positive, got [{0}, {1}]")]
    NonPositiveLogDomain(f64, f64),
}
