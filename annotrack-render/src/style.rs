//! Visual style of a gene annotation track.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use annotrack_core::{ScaleKind, Strand};

/// 24-bit RGB color, written as `#rrggbb` in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub u32);

impl Color {
    pub const BLUE: Color = Color(0x0000ff);
    pub const RED: Color = Color(0xff0000);
    pub const BLACK: Color = Color(0x000000);

    pub fn parse_hex(s: &str) -> Option<Color> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        let expanded = match hex.len() {
            6 => hex.to_string(),
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            _ => return None,
        };
        u32::from_str_radix(&expanded, 16).ok().map(Color)
    }

    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.0 & 0xffffff)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::parse_hex(&s).ok_or_else(|| format!("invalid color: {}", s))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum StyleError {
    #[error("forward and reverse strands would share a vertical center")]
    SharedStrandCenter,
    #[error("glyph size range must be finite and non-empty, got [{0}, {1}]")]
    InvalidSizeRange(f64, f64),
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },
}

/// Offsets are measured from the track's vertical mid-line: forward-strand
/// glyphs and labels sit above it, reverse-strand below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackStyle {
    pub forward_color: Color,
    pub reverse_color: Color,
    pub stroke_width: f64,
    pub font_size: f64,
    pub font_family: String,
    pub forward_glyph_offset: f64,
    pub reverse_glyph_offset: f64,
    pub forward_text_offset: f64,
    pub reverse_text_offset: f64,
    /// Output range of the importance scale (compact block side length).
    pub glyph_size_range: [f64; 2],
    /// Minimum on-screen transcript width before exons are drawn.
    pub block_threshold_px: f64,
    pub line_height: f64,
    pub exon_height: f64,
    /// Mirror label text horizontally (for flipped axes).
    pub flip_text: bool,
    pub x_scale: ScaleKind,
}

impl Default for TrackStyle {
    fn default() -> Self {
        Self {
            forward_color: Color::BLUE,
            reverse_color: Color::RED,
            stroke_width: 1.0,
            font_size: 10.0,
            font_family: "Arial".to_string(),
            forward_glyph_offset: 6.0,
            reverse_glyph_offset: 6.0,
            forward_text_offset: 10.0,
            reverse_text_offset: 23.0,
            glyph_size_range: [0.0, 10.0],
            block_threshold_px: 10.0,
            line_height: 1.5,
            exon_height: 5.0,
            flip_text: false,
            x_scale: ScaleKind::Linear,
        }
    }
}

impl TrackStyle {
    pub fn validate(&self) -> Result<(), StyleError> {
        if -self.forward_glyph_offset == self.reverse_glyph_offset {
            return Err(StyleError::SharedStrandCenter);
        }
        let [lo, hi] = self.glyph_size_range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(StyleError::InvalidSizeRange(lo, hi));
        }
        for (field, value) in [
            ("font_size", self.font_size),
            ("line_height", self.line_height),
            ("exon_height", self.exon_height),
            ("stroke_width", self.stroke_width),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(StyleError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    pub fn strand_color(&self, strand: Strand) -> Color {
        match strand {
            Strand::Forward => self.forward_color,
            Strand::Reverse => self.reverse_color,
        }
    }

    /// Vertical center of a glyph for `strand` on a track `height` pixels tall.
    pub fn glyph_y(&self, strand: Strand, height: f64) -> f64 {
        match strand {
            Strand::Forward => height / 2.0 - self.forward_glyph_offset,
            Strand::Reverse => height / 2.0 + self.reverse_glyph_offset,
        }
    }

    /// Baseline (bottom edge) of a label for `strand`.
    pub fn text_y(&self, strand: Strand, height: f64) -> f64 {
        match strand {
            Strand::Forward => height / 2.0 - self.forward_text_offset,
            Strand::Reverse => height / 2.0 + self.reverse_text_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert_eq!(Color::parse_hex("#2a6fef"), Some(Color(0x2a6fef)));
        assert_eq!(Color::parse_hex("f00"), Some(Color::RED));
        assert_eq!(Color::parse_hex("#12"), None);
        assert_eq!(Color::BLUE.to_hex(), "#0000ff");
    }

    #[test]
    fn strands_never_share_a_center() {
        let style = TrackStyle::default();
        assert!(style.glyph_y(Strand::Forward, 40.0) < style.glyph_y(Strand::Reverse, 40.0));
        assert!(style.validate().is_ok());

        let bad = TrackStyle {
            forward_glyph_offset: 0.0,
            reverse_glyph_offset: 0.0,
            ..TrackStyle::default()
        };
        assert_eq!(bad.validate(), Err(StyleError::SharedStrandCenter));
    }

    #[test]
    fn rejects_empty_size_range() {
        let bad = TrackStyle {
            glyph_size_range: [5.0, 5.0],
            ..TrackStyle::default()
        };
        assert!(matches!(bad.validate(), Err(StyleError::InvalidSizeRange(..))));
    }
}
