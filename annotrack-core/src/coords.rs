use serde::{Deserialize, Serialize};

use crate::error::ScaleError;
use crate::types::GenomicPos;

/// Chromosome-local coordinate to genome-global coordinate.
#[inline]
pub fn to_genome_global(local: GenomicPos, chrom_offset: GenomicPos) -> GenomicPos {
    local.saturating_add(chrom_offset)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    Linear,
    Log,
}

/// Continuous mapping from a genomic domain to a pixel range.
///
/// A new scale is built for every pan/zoom; scales are plain values and
/// never updated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    kind: ScaleKind,
    domain: [f64; 2],
    range: [f64; 2],
}

impl Scale {
    pub fn linear(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            kind: ScaleKind::Linear,
            domain,
            range,
        }
    }

    /// Log10 scale. The domain must be strictly positive.
    pub fn log(domain: [f64; 2], range: [f64; 2]) -> Result<Self, ScaleError> {
        if !(domain[0] > 0.0 && domain[1] > 0.0) {
            return Err(ScaleError::NonPositiveLogDomain(domain[0], domain[1]));
        }
        Ok(Self {
            kind: ScaleKind::Log,
            domain,
            range,
        })
    }

    pub fn with_kind(kind: ScaleKind, domain: [f64; 2], range: [f64; 2]) -> Result<Self, ScaleError> {
        match kind {
            ScaleKind::Linear => Ok(Self::linear(domain, range)),
            ScaleKind::Log => Self::log(domain, range),
        }
    }

    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    /// Width of the output range in pixels.
    pub fn range_width(&self) -> f64 {
        (self.range[1] - self.range[0]).abs()
    }

    fn transform(&self, v: f64) -> f64 {
        match self.kind {
            ScaleKind::Linear => v,
            // Positions below 1 are evaluated as 1
            ScaleKind::Log => v.max(1.0).log10(),
        }
    }

    fn untransform(&self, v: f64) -> f64 {
        match self.kind {
            ScaleKind::Linear => v,
            ScaleKind::Log => 10f64.powf(v),
        }
    }

    /// Map a domain value to the range. A collapsed domain maps everything
    /// to the start of the range.
    pub fn apply(&self, v: f64) -> f64 {
        let d0 = self.transform(self.domain[0]);
        let d1 = self.transform(self.domain[1]);
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return self.range[0];
        }
        let t = (self.transform(v) - d0) / span;
        self.range[0] + t * (self.range[1] - self.range[0])
    }

    /// Map a range value back to the domain.
    pub fn invert(&self, px: f64) -> f64 {
        let r_span = self.range[1] - self.range[0];
        let d0 = self.transform(self.domain[0]);
        let d1 = self.transform(self.domain[1]);
        if r_span == 0.0 {
            return self.domain[0];
        }
        let t = (px - self.range[0]) / r_span;
        self.untransform(d0 + t * (d1 - d0))
    }
}

/// Converts feature coordinates to screen pixels for one frame.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper<'a> {
    x_scale: &'a Scale,
}

impl<'a> CoordinateMapper<'a> {
    pub fn new(x_scale: &'a Scale) -> Self {
        Self { x_scale }
    }

    pub fn to_genome_global(&self, local: GenomicPos, chrom_offset: GenomicPos) -> GenomicPos {
        to_genome_global(local, chrom_offset)
    }

    pub fn to_screen(&self, genome_global: f64) -> f64 {
        self.x_scale.apply(genome_global)
    }

    pub fn local_to_screen(&self, local: GenomicPos, chrom_offset: GenomicPos) -> f64 {
        self.to_screen(self.to_genome_global(local, chrom_offset) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn linear_scale_maps_endpoints() {
        let s = Scale::linear([1000.0, 2000.0], [0.0, 500.0]);
        assert_eq!(s.apply(1000.0), 0.0);
        assert_eq!(s.apply(2000.0), 500.0);
        assert_eq!(s.apply(1500.0), 250.0);
        assert_eq!(s.invert(250.0), 1500.0);
    }

    #[test]
    fn collapsed_domain_maps_to_range_start() {
        let s = Scale::linear([0.0, 0.0], [3.0, 10.0]);
        assert_eq!(s.apply(0.0), 3.0);
        assert_eq!(s.apply(99.0), 3.0);
    }

    #[test]
    fn log_scale_requires_positive_domain() {
        assert!(Scale::log([0.0, 100.0], [0.0, 1.0]).is_err());
        let s = Scale::log([1.0, 100.0], [0.0, 2.0]).unwrap();
        assert!((s.apply(10.0) - 1.0).abs() < 1e-12);
        assert!((s.invert(1.0) - 10.0).abs() < 1e-9);
        // values below 1 clamp
        assert_eq!(s.apply(0.0), 0.0);
    }

    #[test]
    fn mapper_translates_then_scales() {
        let s = Scale::linear([0.0, 100.0], [0.0, 100.0]);
        let m = CoordinateMapper::new(&s);
        assert_eq!(m.to_genome_global(10, 30), 40);
        assert_eq!(m.local_to_screen(10, 30), 40.0);
    }

    proptest! {
        #[test]
        fn genome_global_is_pure_translation(x in -1_000_000_000i64..1_000_000_000, c in 0i64..4_000_000_000) {
            prop_assert_eq!(to_genome_global(x, c), x + c);
            prop_assert_eq!(to_genome_global(x + 1, c) - to_genome_global(x, c), 1);
        }

        #[test]
        fn linear_scale_is_monotonic(a in 0.0f64..1e9, b in 0.0f64..1e9) {
            let s = Scale::linear([0.0, 1e9], [0.0, 1200.0]);
            if a <= b {
                prop_assert!(s.apply(a) <= s.apply(b));
            }
        }
    }
}
