use serde::Deserialize;

// ─── Wire records ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VariantInfo {
    pub variant_id: String,
    #[serde(default)]
    pub rsid: Option<String>,
    /// Genomic coordinate on the queried chromosome, in base pairs.
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneInfo {
    pub gene_id: String,
    #[serde(default)]
    pub gene_name: Option<String>,
}

/// One variant-gene association as returned by the bulk query.
/// `pvalue` is in (0, 1]; `se` is ≥ 0. Both are supplied by the backend,
/// never derived here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssociationRecord {
    pub variant: VariantInfo,
    pub gene: GeneInfo,
    pub pvalue: f64,
    pub beta: f64,
    pub se: f64,
}

/// One exon of the queried gene. `start_position <= end_position`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExonRecord {
    pub start_position: i64,
    pub end_position: i64,
}

/// Result of the on-demand detail fetch for a single (variant, gene) pair.
/// Replaced wholesale on each selection change.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EffectSizeDetail {
    pub variant: VariantInfo,
    pub gene: GeneInfo,
    pub beta: f64,
    pub se: f64,
    pub pvalue: f64,
}

// ─── Dataset ─────────────────────────────────────────────────────────

/// The current dataset: the full association set for one gene query,
/// immutable after construction. `-log10(pvalue)` is computed once here
/// and never recomputed by the rendering layers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    records: Vec<AssociationRecord>,
    log_significance: Vec<f64>,
}

impl Dataset {
    pub fn new(records: Vec<AssociationRecord>) -> Self {
        let log_significance = records.iter().map(|r| -r.pvalue.log10()).collect();
        Self {
            records,
            log_significance,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AssociationRecord] {
        &self.records
    }

    /// `-log10(pvalue)` per record, index-aligned with `records()`.
    pub fn log_significance(&self) -> &[f64] {
        &self.log_significance
    }

    /// Min/max genomic position across the dataset.
    pub fn position_extent(&self) -> Option<(i64, i64)> {
        let mut it = self.records.iter().map(|r| r.variant.position);
        let first = it.next()?;
        let (mut lo, mut hi) = (first, first);
        for p in it {
            lo = lo.min(p);
            hi = hi.max(p);
        }
        Some((lo, hi))
    }

    /// Largest `-log10(pvalue)` in the dataset, 0.0 when empty.
    pub fn max_log_significance(&self) -> f64 {
        self.log_significance.iter().copied().fold(0.0, f64::max)
    }

    pub fn index_of_variant(&self, variant_id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.variant.variant_id == variant_id)
    }
}

/// Gene body extent: min(start)..max(end) over the exon set.
pub fn gene_body_extent(exons: &[ExonRecord]) -> Option<(i64, i64)> {
    let mut it = exons.iter();
    let first = it.next()?;
    let (mut lo, mut hi) = (first.start_position, first.end_position);
    for e in it {
        lo = lo.min(e.start_position);
        hi = hi.max(e.end_position);
    }
    Some((lo, hi))
}
