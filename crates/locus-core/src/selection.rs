use crate::types::Dataset;

/// The one variant-gene pair the whole UI agrees is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedVariant {
    pub variant_id: String,
    pub gene_id: String,
}

/// Process-wide selection state. At most one variant is selected; every
/// view (scatter point, table row, effect-size panel) reads from here
/// rather than keeping its own notion of "currently selected".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    current: Option<SelectedVariant>,
}

impl Selection {
    pub fn select(&mut self, variant_id: String, gene_id: String) {
        self.current = Some(SelectedVariant {
            variant_id,
            gene_id,
        });
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&SelectedVariant> {
        self.current.as_ref()
    }

    pub fn is_selected(&self, variant_id: &str) -> bool {
        self.current
            .as_ref()
            .is_some_and(|s| s.variant_id == variant_id)
    }

    /// Drop the selection if its variant is not in `dataset`. A selection
    /// carried across a new gene query would otherwise point at a stale id.
    pub fn revalidate(&mut self, dataset: &Dataset) {
        if let Some(ref s) = self.current {
            if dataset.index_of_variant(&s.variant_id).is_none() {
                self.current = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssociationRecord, GeneInfo, VariantInfo};

    fn dataset(ids: &[&str]) -> Dataset {
        Dataset::new(
            ids.iter()
                .enumerate()
                .map(|(i, id)| AssociationRecord {
                    variant: VariantInfo {
                        variant_id: id.to_string(),
                        rsid: None,
                        position: 1000 + i as i64,
                    },
                    gene: GeneInfo {
                        gene_id: "g1".to_string(),
                        gene_name: None,
                    },
                    pvalue: 0.01,
                    beta: 0.1,
                    se: 0.02,
                })
                .collect(),
        )
    }

    #[test]
    fn test_reselect_replaces_previous() {
        let mut sel = Selection::default();
        sel.select("v1".to_string(), "g1".to_string());
        sel.select("v2".to_string(), "g1".to_string());
        assert!(sel.is_selected("v2"));
        assert!(!sel.is_selected("v1"));
    }

    #[test]
    fn test_revalidate_drops_stale_id() {
        let mut sel = Selection::default();
        sel.select("v1".to_string(), "g1".to_string());
        sel.revalidate(&dataset(&["v2", "v3"]));
        assert_eq!(sel.current(), None);
    }

    #[test]
    fn test_revalidate_keeps_live_id() {
        let mut sel = Selection::default();
        sel.select("v2".to_string(), "g1".to_string());
        sel.revalidate(&dataset(&["v1", "v2"]));
        assert!(sel.is_selected("v2"));
    }
}
