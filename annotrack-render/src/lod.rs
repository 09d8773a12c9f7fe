/*!
# Glyph Level of Detail

Each feature is drawn at one of two levels depending on how many pixels its
transcript spans at the current zoom:
- Block: a square sized by importance, for features too narrow to resolve
- Exons: the full exon/intron structure once the span is wide enough
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum GlyphKind {
    /// Compact square centered on the transcript middle
    Block,
    /// Backbone line plus one block per exon
    Exons,
}

/// Picks the glyph for a feature spanning `[screen_start, screen_end]`.
/// Exons are drawn only when the span is strictly wider than the threshold.
pub fn determine_glyph(screen_start: f64, screen_end: f64, threshold_px: f64) -> GlyphKind {
    if screen_end - screen_start > threshold_px {
        GlyphKind::Exons
    } else {
        GlyphKind::Block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_span_is_a_block() {
        assert_eq!(determine_glyph(100.0, 105.0, 10.0), GlyphKind::Block);
        assert_eq!(determine_glyph(100.0, 110.0, 10.0), GlyphKind::Block);
        assert_eq!(determine_glyph(100.0, 110.5, 10.0), GlyphKind::Exons);
    }
}
