use crate::types::Dataset;

/// Multiplicative headroom above the most significant point on the y axis.
pub const Y_HEADROOM: f64 = 1.1;

/// Half-width of a two-sided 95% confidence interval, in standard errors.
pub const CI_Z: f64 = 1.96;

/// Span substituted for a collapsed (empty or single-point) domain so the
/// map stays finite.
const FALLBACK_HALF_SPAN: f64 = 1.0;

/// Linear domain→pixel map. A zero-width domain is widened to
/// `value ± FALLBACK_HALF_SPAN` at construction, so `apply` never divides
/// by zero and never produces NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let domain = if (domain.1 - domain.0).abs() < f64::EPSILON {
            (
                domain.0 - FALLBACK_HALF_SPAN,
                domain.0 + FALLBACK_HALF_SPAN,
            )
        } else {
            domain
        };
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Same domain, different pixel range. Used to compose the viewport
    /// transform onto a base scale.
    pub fn with_range(&self, range: (f64, f64)) -> Self {
        Self {
            domain: self.domain,
            range,
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let t = (value - self.domain.0) / (self.domain.1 - self.domain.0);
        self.range.0 + t * (self.range.1 - self.range.0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let t = (pixel - self.range.0) / (self.range.1 - self.range.0);
        self.domain.0 + t * (self.domain.1 - self.domain.0)
    }
}

/// The locus plot's mapper pair. `x`: genomic position → [0, width].
/// `y`: -log10(p) → [height, 0], inverted so larger significance draws
/// higher, with fixed ×1.1 headroom above the maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotScales {
    pub x: LinearScale,
    pub y: LinearScale,
}

impl PlotScales {
    pub fn fit(dataset: &Dataset, width: f64, height: f64) -> Self {
        let (lo, hi) = dataset.position_extent().unwrap_or((0, 1));
        let x = LinearScale::new((lo as f64, hi as f64), (0.0, width));
        let y = LinearScale::new(
            (0.0, dataset.max_log_significance() * Y_HEADROOM),
            (height, 0.0),
        );
        Self { x, y }
    }
}

/// Vertical scale for the effect-size panel: covers beta ± 1.96·se and is
/// forced to include the zero baseline, with a small pad so whisker caps
/// stay inside the panel.
pub fn effect_scale(beta: f64, se: f64, height: f64) -> LinearScale {
    let lo = (beta - CI_Z * se).min(0.0);
    let hi = (beta + CI_Z * se).max(0.0);
    let pad = (hi - lo) * 0.1;
    LinearScale::new((lo - pad, hi + pad), (height, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssociationRecord, GeneInfo, VariantInfo};
    use approx::assert_relative_eq;

    fn record(position: i64, pvalue: f64) -> AssociationRecord {
        AssociationRecord {
            variant: VariantInfo {
                variant_id: format!("chr17_{}_A_G", position),
                rsid: None,
                position,
            },
            gene: GeneInfo {
                gene_id: "ENSG00000100000".to_string(),
                gene_name: None,
            },
            pvalue,
            beta: 0.2,
            se: 0.04,
        }
    }

    #[test]
    fn test_extent_maps_to_exact_pixel_bounds() {
        let ds = Dataset::new(vec![
            record(100_000, 0.01),
            record(150_000, 0.002),
            record(200_000, 0.04),
        ]);
        let scales = PlotScales::fit(&ds, 800.0, 400.0);
        assert_eq!(scales.x.apply(100_000.0), 0.0);
        assert_eq!(scales.x.apply(200_000.0), 800.0);
    }

    #[test]
    fn test_empty_dataset_is_finite() {
        let ds = Dataset::default();
        let scales = PlotScales::fit(&ds, 800.0, 400.0);
        for v in [-1e9, 0.0, 42.0, 1e9] {
            assert!(scales.x.apply(v).is_finite());
            assert!(scales.y.apply(v).is_finite());
        }
    }

    #[test]
    fn test_single_point_is_finite() {
        let ds = Dataset::new(vec![record(123_456, 0.01)]);
        let scales = PlotScales::fit(&ds, 800.0, 400.0);
        let px = scales.x.apply(123_456.0);
        assert!(px.is_finite());
        // A single point maps to the middle of its fallback span.
        assert_relative_eq!(px, 400.0);
    }

    #[test]
    fn test_y_inverted_with_headroom() {
        let ds = Dataset::new(vec![record(100, 1e-8), record(200, 0.05)]);
        let scales = PlotScales::fit(&ds, 800.0, 400.0);
        assert_eq!(scales.y.apply(0.0), 400.0);
        // Max significance sits below the top edge by the headroom factor.
        assert_relative_eq!(scales.y.apply(8.0 * Y_HEADROOM), 0.0);
        assert!(scales.y.apply(8.0) > 0.0);
        assert!(scales.y.apply(8.0) < 400.0 / Y_HEADROOM);
    }

    #[test]
    fn test_invert_roundtrip() {
        let s = LinearScale::new((100.0, 500.0), (0.0, 800.0));
        assert_relative_eq!(s.invert(s.apply(321.0)), 321.0, max_relative = 1e-12);
    }

    #[test]
    fn test_effect_scale_contains_zero() {
        for (beta, se) in [(0.3, 0.05), (-0.4, 0.1), (0.0, 0.0)] {
            let s = effect_scale(beta, se, 200.0);
            let (lo, hi) = s.domain();
            assert!(lo <= 0.0 && hi >= 0.0);
            assert!(s.apply(0.0).is_finite());
            assert!(s.apply(beta).is_finite());
        }
    }

    #[test]
    fn test_effect_scale_covers_interval() {
        let s = effect_scale(0.25, 0.08, 200.0);
        let (lo, hi) = s.domain();
        assert!(lo < 0.25 - CI_Z * 0.08);
        assert!(hi > 0.25 + CI_Z * 0.08);
    }
}
