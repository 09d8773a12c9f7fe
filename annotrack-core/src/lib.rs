//! annotrack core library
//!
//! Typed gene annotation records, tile identifiers, coordinate mapping,
//! importance scaling and the tile-row decoding boundary.

pub mod coords;
pub mod error;
pub mod genome;
pub mod io;
pub mod scale;
pub mod tiles;
pub mod types;

// Re-export commonly used types and functions
pub use coords::{to_genome_global, CoordinateMapper, Scale, ScaleKind};
pub use error::{FeatureError, ScaleError, TilesetError};
pub use genome::ChromSizes;
pub use io::{DecodeReport, Tileset};
pub use scale::ValueScale;
pub use tiles::{build_tileset, TileBuildConfig};
pub use types::{Feature, GenomicPos, Strand, TileId, TilesetInfo, ZoomLevel};

/// Version information for the annotrack core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
