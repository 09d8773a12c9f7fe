/*!
# annotrack Rendering Pipeline

Turns fetched annotation tiles into glyphs and labels for one horizontal
gene track.

## Architecture

Every redraw is a stateless pass over the fetched tiles:
1. **Deduplication**: tiles with a fetched ancestor are skipped and their labels hidden
2. **Glyphs**: each feature becomes a compact block or a full exon structure,
   depending on its on-screen width
3. **Labels**: labels are placed at the feature middle and collected into an
   active set
4. **Overlap resolution**: colliding labels of lower rank are hidden

The tile source and the drawing surface are traits ([`TileSource`],
[`RenderSurface`]); [`TileStore`] and [`SvgSurface`] are the bundled
implementations.
*/

pub mod glyph;
pub mod labels;
pub mod lod;
pub mod overlap;
pub mod style;
pub mod surface;
pub mod tiling;
pub mod track;
pub mod vector_export;

pub use glyph::{draw_exons, exon_rects, FeatureLayout, GlyphError};
pub use labels::{Label, TileLabels};
pub use lod::{determine_glyph, GlyphKind};
pub use overlap::{hide_overlaps, ActiveLabel, ActiveLabelSet, Resolution, ResolvedLabel};
pub use style::{Color, StyleError, TrackStyle};
pub use surface::{Aabb2, Rect, RenderSurface, ShapeStyle, TextId, TextSpec, Visibility};
pub use tiling::{Tile, TileSource, TileStore};
pub use track::{FrameStats, GeneAnnotationsTrack};
pub use vector_export::{ExportConfig, SvgSurface};

/// Builds an x scale of the configured kind for the genome-global span
/// `[start, end]` drawn across `width` pixels.
pub fn x_scale_for(style: &TrackStyle, start: f64, end: f64, width: f64) -> Result<annotrack_core::Scale, annotrack_core::ScaleError> {
    annotrack_core::Scale::with_kind(style.x_scale, [start, end], [0.0, width])
}
