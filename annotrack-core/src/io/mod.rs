//! Ingestion boundary: tile rows, tileset files and BED annotations are
//! turned into typed [`Feature`](crate::types::Feature) records here and
//! nowhere else.

pub mod bed;
pub mod rows;
pub mod tileset;

pub use bed::{BedError, BedParser};
pub use rows::{decode_row, decode_rows, encode_row, DecodeReport};
pub use tileset::Tileset;
