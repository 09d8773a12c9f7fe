//! Importance-to-glyph-size scale.

use crate::coords::Scale;
use crate::types::Feature;

/// Maps `ln(importance + 1)` linearly from `[0, ln(max_importance + 1)]`
/// onto a pixel size range.
///
/// Built once per redraw from every feature of every fetched tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScale {
    max_importance: f64,
    inner: Scale,
}

impl ValueScale {
    pub fn new(max_importance: f64, size_range: [f64; 2]) -> Self {
        let max_importance = if max_importance.is_finite() {
            max_importance.max(0.0)
        } else {
            0.0
        };
        Self {
            max_importance,
            inner: Scale::linear([0.0, (max_importance + 1.0).ln()], size_range),
        }
    }

    pub fn from_features<'a, I>(features: I, size_range: [f64; 2]) -> Self
    where
        I: IntoIterator<Item = &'a Feature>,
    {
        let max_importance = features
            .into_iter()
            .map(|f| f.importance)
            .filter(|v| v.is_finite())
            .fold(0.0f64, f64::max);
        Self::new(max_importance, size_range)
    }

    pub fn max_importance(&self) -> f64 {
        self.max_importance
    }

    /// Glyph size for `importance`. A zero maximum collapses the domain and
    /// every importance maps to the range minimum.
    pub fn size(&self, importance: f64) -> f64 {
        let [r0, r1] = self.inner.range();
        let (lo, hi) = if r0 <= r1 { (r0, r1) } else { (r1, r0) };
        if self.max_importance <= 0.0 || !importance.is_finite() {
            return lo;
        }
        self.inner
            .apply((importance.max(0.0) + 1.0).ln())
            .clamp(lo, hi)
    }
}
