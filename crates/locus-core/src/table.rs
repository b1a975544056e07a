use std::cmp::Ordering;

use crate::types::Dataset;

/// Columns the results table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    VariantId,
    Rsid,
    GeneId,
    GeneName,
    PValue,
    Beta,
    Se,
    Position,
}

impl SortKey {
    /// Column order of the results table and the CSV export.
    pub const ALL: [SortKey; 8] = [
        SortKey::VariantId,
        SortKey::Rsid,
        SortKey::GeneId,
        SortKey::GeneName,
        SortKey::PValue,
        SortKey::Beta,
        SortKey::Se,
        SortKey::Position,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::VariantId => "Variant ID",
            SortKey::Rsid => "RSID",
            SortKey::GeneId => "Gene ID",
            SortKey::GeneName => "Gene Name",
            SortKey::PValue => "P-value",
            SortKey::Beta => "Beta",
            SortKey::Se => "SE",
            SortKey::Position => "Position",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Derives the table's display order from the dataset. The dataset itself
/// is never reordered; the plot and the CSV export keep the original
/// fetch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableProjection {
    key: SortKey,
    direction: SortDirection,
}

impl Default for TableProjection {
    fn default() -> Self {
        Self::new(SortKey::Position, SortDirection::Ascending)
    }
}

impl TableProjection {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn key(&self) -> SortKey {
        self.key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Clicking the active column flips direction; any other column becomes
    /// the active key, ascending.
    pub fn set_sort(&mut self, key: SortKey) {
        if key == self.key {
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }

    /// Stable display order over the dataset's record indices.
    pub fn row_order(&self, dataset: &Dataset) -> Vec<usize> {
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        order.sort_by(|&a, &b| {
            let ord = compare_records(dataset, a, b, self.key);
            match self.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
        order
    }
}

// Absent rsid/gene_name compare as the empty string so the ordering stays
// total. Floats go through total_cmp for the same reason.
fn compare_records(dataset: &Dataset, a: usize, b: usize, key: SortKey) -> Ordering {
    let ra = &dataset.records()[a];
    let rb = &dataset.records()[b];
    match key {
        SortKey::VariantId => ra.variant.variant_id.cmp(&rb.variant.variant_id),
        SortKey::Rsid => ra
            .variant
            .rsid
            .as_deref()
            .unwrap_or("")
            .cmp(rb.variant.rsid.as_deref().unwrap_or("")),
        SortKey::GeneId => ra.gene.gene_id.cmp(&rb.gene.gene_id),
        SortKey::GeneName => ra
            .gene
            .gene_name
            .as_deref()
            .unwrap_or("")
            .cmp(rb.gene.gene_name.as_deref().unwrap_or("")),
        SortKey::PValue => ra.pvalue.total_cmp(&rb.pvalue),
        SortKey::Beta => ra.beta.total_cmp(&rb.beta),
        SortKey::Se => ra.se.total_cmp(&rb.se),
        SortKey::Position => ra.variant.position.cmp(&rb.variant.position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssociationRecord, GeneInfo, VariantInfo};

    fn record(id: &str, rsid: Option<&str>, position: i64, pvalue: f64) -> AssociationRecord {
        AssociationRecord {
            variant: VariantInfo {
                variant_id: id.to_string(),
                rsid: rsid.map(str::to_string),
                position,
            },
            gene: GeneInfo {
                gene_id: "g1".to_string(),
                gene_name: None,
            },
            pvalue,
            beta: 0.1,
            se: 0.02,
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![
            record("v1", Some("rs30"), 300, 0.04),
            record("v2", None, 100, 0.001),
            record("v3", Some("rs10"), 200, 0.02),
        ])
    }

    #[test]
    fn test_default_is_position_ascending() {
        let proj = TableProjection::default();
        assert_eq!(proj.row_order(&dataset()), vec![1, 2, 0]);
    }

    #[test]
    fn test_same_key_flips_to_exact_reverse() {
        let mut proj = TableProjection::default();
        proj.set_sort(SortKey::PValue);
        let asc = proj.row_order(&dataset());
        proj.set_sort(SortKey::PValue);
        let desc = proj.row_order(&dataset());
        assert_eq!(asc, vec![1, 2, 0]);
        let mut reversed = asc.clone();
        reversed.reverse();
        assert_eq!(desc, reversed);
    }

    #[test]
    fn test_new_key_adopts_ascending() {
        let mut proj = TableProjection::default();
        proj.set_sort(SortKey::Position);
        assert_eq!(proj.direction(), SortDirection::Descending);
        proj.set_sort(SortKey::Beta);
        assert_eq!(proj.key(), SortKey::Beta);
        assert_eq!(proj.direction(), SortDirection::Ascending);
    }

    #[test]
    fn test_missing_rsid_sorts_as_empty() {
        let mut proj = TableProjection::default();
        proj.set_sort(SortKey::Rsid);
        // "" < "rs10" < "rs30"
        assert_eq!(proj.row_order(&dataset()), vec![1, 2, 0]);
    }

    #[test]
    fn test_sort_does_not_mutate_dataset() {
        let ds = dataset();
        let before: Vec<String> = ds
            .records()
            .iter()
            .map(|r| r.variant.variant_id.clone())
            .collect();
        let mut proj = TableProjection::default();
        proj.set_sort(SortKey::PValue);
        let _ = proj.row_order(&ds);
        let after: Vec<String> = ds
            .records()
            .iter()
            .map(|r| r.variant.variant_id.clone())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_empty_dataset_has_empty_order() {
        assert!(TableProjection::default()
            .row_order(&Dataset::default())
            .is_empty());
    }
}
