//! Feature glyphs: compact blocks and exon/intron structures.

use thiserror::Error;

use annotrack_core::{CoordinateMapper, Feature, GenomicPos, ValueScale};

use crate::lod::{determine_glyph, GlyphKind};
use crate::style::TrackStyle;
use crate::surface::{Rect, RenderSurface, ShapeStyle};

#[derive(Debug, Error, PartialEq)]
pub enum GlyphError {
    #[error("exon starts/ends length mismatch ({starts} starts, {ends} ends)")]
    ExonCountMismatch { starts: usize, ends: usize },
}

/// Screen-space layout of one feature for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureLayout {
    pub screen_start: f64,
    pub screen_end: f64,
    pub screen_middle: f64,
    pub glyph_y: f64,
    pub text_y: f64,
    pub kind: GlyphKind,
}

impl FeatureLayout {
    pub fn compute(feature: &Feature, mapper: &CoordinateMapper<'_>, style: &TrackStyle, height: f64) -> Self {
        let screen_start = mapper.local_to_screen(feature.chrom_local_start, feature.chrom_offset);
        let screen_end = mapper.local_to_screen(feature.chrom_local_end, feature.chrom_offset);
        Self {
            screen_start,
            screen_end,
            screen_middle: mapper.to_screen(feature.genome_middle()),
            glyph_y: style.glyph_y(feature.strand, height),
            text_y: style.text_y(feature.strand, height),
            kind: determine_glyph(screen_start, screen_end, style.block_threshold_px),
        }
    }
}

/// Draw a single feature in the representation its layout selects.
pub fn draw_feature<S: RenderSurface + ?Sized>(
    surface: &mut S,
    feature: &Feature,
    layout: &FeatureLayout,
    mapper: &CoordinateMapper<'_>,
    value_scale: &ValueScale,
    style: &TrackStyle,
) -> Result<GlyphKind, GlyphError> {
    surface.set_style(ShapeStyle {
        stroke_width: style.stroke_width,
        color: style.strand_color(feature.strand),
    });

    match layout.kind {
        GlyphKind::Exons => {
            if feature.exon_starts.len() != feature.exon_ends.len() {
                return Err(GlyphError::ExonCountMismatch {
                    starts: feature.exon_starts.len(),
                    ends: feature.exon_ends.len(),
                });
            }
            let (starts, ends): (Vec<GenomicPos>, Vec<GenomicPos>) = feature.genome_exons().unzip();
            draw_exons(
                surface,
                mapper,
                (feature.genome_start(), feature.genome_end()),
                &starts,
                &ends,
                layout.glyph_y,
                style,
            )?;
        }
        GlyphKind::Block => {
            let side = value_scale.size(feature.importance);
            surface.fill_rect(block_rect(layout.screen_middle, layout.glyph_y, side));
        }
    }
    Ok(layout.kind)
}

/// Square of side `side` centered at `(x, y)`.
pub fn block_rect(x: f64, y: f64, side: f64) -> Rect {
    Rect::new(x - side / 2.0, y - side / 2.0, side, side)
}

/// Rectangles for a transcript: the backbone first, then one per exon.
///
/// Coordinates are genome-global. Exon spans are clipped to the transcript
/// so every exon block lies within the backbone; exons entirely outside it
/// are dropped.
pub fn exon_rects(
    mapper: &CoordinateMapper<'_>,
    transcript: (GenomicPos, GenomicPos),
    exon_starts: &[GenomicPos],
    exon_ends: &[GenomicPos],
    y_middle: f64,
    style: &TrackStyle,
) -> Result<Vec<Rect>, GlyphError> {
    if exon_starts.len() != exon_ends.len() {
        return Err(GlyphError::ExonCountMismatch {
            starts: exon_starts.len(),
            ends: exon_ends.len(),
        });
    }

    let (tx_start, tx_end) = transcript;
    let x_start = mapper.to_screen(tx_start as f64);
    let x_end = mapper.to_screen(tx_end as f64);

    let mut rects = Vec::with_capacity(exon_starts.len() + 1);
    rects.push(Rect::new(
        x_start,
        y_middle - style.line_height / 2.0,
        x_end - x_start,
        style.line_height,
    ));

    let exon_y = y_middle - style.exon_height / 2.0;
    for (&start, &end) in exon_starts.iter().zip(exon_ends.iter()) {
        let start = start.max(tx_start);
        let end = end.min(tx_end);
        if start > end {
            continue;
        }
        let x0 = mapper.to_screen(start as f64);
        let x1 = mapper.to_screen(end as f64);
        rects.push(Rect::new(x0, exon_y, x1 - x0, style.exon_height));
    }

    Ok(rects)
}

pub fn draw_exons<S: RenderSurface + ?Sized>(
    surface: &mut S,
    mapper: &CoordinateMapper<'_>,
    transcript: (GenomicPos, GenomicPos),
    exon_starts: &[GenomicPos],
    exon_ends: &[GenomicPos],
    y_middle: f64,
    style: &TrackStyle,
) -> Result<(), GlyphError> {
    for rect in exon_rects(mapper, transcript, exon_starts, exon_ends, y_middle, style)? {
        surface.fill_rect(rect);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use annotrack_core::Scale;

    fn identity() -> Scale {
        Scale::linear([0.0, 1000.0], [0.0, 1000.0])
    }

    #[test]
    fn backbone_spans_transcript_and_exons_stay_inside() {
        let scale = Scale::linear([0.0, 1000.0], [0.0, 2000.0]);
        let mapper = CoordinateMapper::new(&scale);
        let style = TrackStyle::default();
        let rects = exon_rects(&mapper, (100, 400), &[50, 200, 390], &[150, 250, 500], 20.0, &style).unwrap();

        let backbone = rects[0];
        assert_eq!(backbone.x, 200.0);
        assert_eq!(backbone.right(), 800.0);
        assert_eq!(backbone.height, style.line_height);
        assert_eq!(rects.len(), 4);
        for exon in &rects[1..] {
            assert!(exon.x >= backbone.x && exon.right() <= backbone.right());
            assert_eq!(exon.height, style.exon_height);
            assert_eq!(exon.y + exon.height / 2.0, 20.0);
        }
        assert_eq!(rects[1].x, 200.0);
        assert_eq!(rects[3].right(), 800.0);
    }

    #[test]
    fn zero_exons_draws_backbone_only() {
        let scale = identity();
        let mapper = CoordinateMapper::new(&scale);
        let rects = exon_rects(&mapper, (10, 90), &[], &[], 5.0, &TrackStyle::default()).unwrap();
        assert_eq!(rects.len(), 1);
    }

    #[test]
    fn mismatched_exons_are_rejected() {
        let scale = identity();
        let mapper = CoordinateMapper::new(&scale);
        assert_eq!(
            exon_rects(&mapper, (10, 90), &[10, 20], &[15], 5.0, &TrackStyle::default()),
            Err(GlyphError::ExonCountMismatch { starts: 2, ends: 1 })
        );
    }

    #[test]
    fn block_is_centered() {
        let r = block_rect(50.0, 20.0, 8.0);
        assert_eq!(r, Rect::new(46.0, 16.0, 8.0, 8.0));
    }
}
