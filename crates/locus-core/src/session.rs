use log::{debug, warn};

use crate::error::LocusError;
use crate::export::dataset_to_csv;
use crate::scale::PlotScales;
use crate::selection::Selection;
use crate::table::{SortKey, TableProjection};
use crate::types::{AssociationRecord, Dataset, EffectSizeDetail, ExonRecord};
use crate::viewport::{Viewport, ZOOM_STEP};

// ─── Request tokens ─────────────────────────────────────────────────

/// Ties an in-flight association/exon fetch to the search that issued it.
/// Responses carrying anything but the latest token are discarded, which
/// makes a burst of overlapping searches last-request-wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchToken(u64);

/// Same guard for the per-selection effect-size fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailToken(u64);

/// A search the caller should now run against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub token: SearchToken,
    pub gene_name: String,
}

/// A detail fetch the caller should now run against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub token: DetailToken,
    pub variant_id: String,
    pub gene_id: String,
}

// ─── Session ────────────────────────────────────────────────────────

/// Owns every piece of mutable view state (dataset, exons, detail,
/// viewport, selection, sort) and exposes one named operation per user
/// action. Rendering layers are pure functions over this state; nothing
/// else mutates it.
#[derive(Debug, Default)]
pub struct Session {
    dataset: Dataset,
    exons: Vec<ExonRecord>,
    detail: Option<EffectSizeDetail>,
    viewport: Viewport,
    selection: Selection,
    table: TableProjection,
    search_seq: u64,
    detail_seq: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Search lifecycle ───────────────────────────────────────────

    /// Validate the search term and issue a fresh token. Rejects blank
    /// input before any request goes out.
    pub fn begin_search(&mut self, term: &str) -> Result<SearchRequest, LocusError> {
        let gene_name = term.trim();
        if gene_name.is_empty() {
            return Err(LocusError::EmptyQuery);
        }
        self.search_seq += 1;
        Ok(SearchRequest {
            token: SearchToken(self.search_seq),
            gene_name: gene_name.to_string(),
        })
    }

    /// Install a search response. Returns false (state untouched) when the
    /// token is stale. On success the dataset is replaced wholesale, the
    /// viewport returns to identity, and selection/exons/detail are
    /// cleared — the new coordinate domain invalidates all of them.
    pub fn apply_associations(
        &mut self,
        token: SearchToken,
        records: Vec<AssociationRecord>,
    ) -> bool {
        if token.0 != self.search_seq {
            debug!(
                "dropping stale association response (token {}, current {})",
                token.0, self.search_seq
            );
            return false;
        }
        debug!("dataset replaced: {} records", records.len());
        self.dataset = Dataset::new(records);
        self.exons.clear();
        self.detail = None;
        self.viewport.reset();
        self.selection.clear();
        true
    }

    /// Install the exon set for the current search; same staleness guard.
    pub fn apply_exons(&mut self, token: SearchToken, exons: Vec<ExonRecord>) -> bool {
        if token.0 != self.search_seq {
            debug!("dropping stale exon response (token {})", token.0);
            return false;
        }
        self.exons = exons;
        true
    }

    // ─── Selection ──────────────────────────────────────────────────

    /// Select a variant and request its effect-size detail. The id is
    /// validated against the current dataset first; an unknown id leaves
    /// selection untouched and triggers no fetch.
    pub fn select(&mut self, variant_id: &str, gene_id: &str) -> Option<DetailRequest> {
        if self.dataset.index_of_variant(variant_id).is_none() {
            warn!("select ignored: {} not in current dataset", variant_id);
            return None;
        }
        self.selection
            .select(variant_id.to_string(), gene_id.to_string());
        self.detail_seq += 1;
        Some(DetailRequest {
            token: DetailToken(self.detail_seq),
            variant_id: variant_id.to_string(),
            gene_id: gene_id.to_string(),
        })
    }

    /// Install an effect-size response; replaced wholesale per selection.
    pub fn apply_effect_detail(&mut self, token: DetailToken, detail: EffectSizeDetail) -> bool {
        if token.0 != self.detail_seq {
            debug!("dropping stale effect-size response (token {})", token.0);
            return false;
        }
        self.detail = Some(detail);
        true
    }

    // ─── Viewport ───────────────────────────────────────────────────

    pub fn zoom_in(&mut self, width: f64) {
        self.viewport.zoom_by(ZOOM_STEP, width);
    }

    pub fn zoom_out(&mut self, width: f64) {
        self.viewport.zoom_by(1.0 / ZOOM_STEP, width);
    }

    pub fn zoom_about(&mut self, factor: f64, anchor_px: f64, width: f64) {
        self.viewport.zoom_about(factor, anchor_px, width);
    }

    pub fn pan_by(&mut self, dx: f64, width: f64) {
        self.viewport.pan_by(dx, width);
    }

    // ─── Table ──────────────────────────────────────────────────────

    pub fn set_sort(&mut self, key: SortKey) {
        self.table.set_sort(key);
    }

    pub fn row_order(&self) -> Vec<usize> {
        self.table.row_order(&self.dataset)
    }

    pub fn table(&self) -> &TableProjection {
        &self.table
    }

    // ─── Export ─────────────────────────────────────────────────────

    /// CSV of the dataset in fetch order, regardless of the table sort.
    pub fn export_csv(&self) -> Result<String, LocusError> {
        dataset_to_csv(&self.dataset)
    }

    // ─── Read access for rendering ──────────────────────────────────

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn exons(&self) -> &[ExonRecord] {
        &self.exons
    }

    pub fn detail(&self) -> Option<&EffectSizeDetail> {
        self.detail.as_ref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Dataset index of the selected variant, if any.
    pub fn selected_index(&self) -> Option<usize> {
        self.selection
            .current()
            .and_then(|s| self.dataset.index_of_variant(&s.variant_id))
    }

    /// The one scale pair every position-dependent layer must share this
    /// frame: base mappers fit to the dataset, with the viewport transform
    /// already composed onto x.
    pub fn composed_scales(&self, width: f64, height: f64) -> PlotScales {
        let base = PlotScales::fit(&self.dataset, width, height);
        PlotScales {
            x: self.viewport.transform(&base.x),
            y: base.y,
        }
    }

    /// Display name for the queried gene, preferring the symbol over the id.
    pub fn gene_label(&self) -> Option<&str> {
        let gene = &self.dataset.records().first()?.gene;
        Some(gene.gene_name.as_deref().unwrap_or(&gene.gene_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GeneInfo, VariantInfo};

    fn record(id: &str, position: i64, pvalue: f64) -> AssociationRecord {
        AssociationRecord {
            variant: VariantInfo {
                variant_id: id.to_string(),
                rsid: None,
                position,
            },
            gene: GeneInfo {
                gene_id: "ENSG00000141510".to_string(),
                gene_name: Some("TP53".to_string()),
            },
            pvalue,
            beta: 0.3,
            se: 0.05,
        }
    }

    fn detail_for(req: &DetailRequest) -> EffectSizeDetail {
        EffectSizeDetail {
            variant: VariantInfo {
                variant_id: req.variant_id.clone(),
                rsid: None,
                position: 0,
            },
            gene: GeneInfo {
                gene_id: req.gene_id.clone(),
                gene_name: None,
            },
            beta: 0.3,
            se: 0.05,
            pvalue: 0.001,
        }
    }

    fn loaded_session() -> Session {
        let mut session = Session::new();
        let req = session.begin_search("TP53").unwrap();
        assert!(session.apply_associations(
            req.token,
            vec![
                record("v1", 100_000, 0.01),
                record("v2", 150_000, 1e-8),
                record("v3", 200_000, 0.04),
            ],
        ));
        session
    }

    #[test]
    fn test_blank_search_rejected() {
        let mut session = Session::new();
        assert!(matches!(
            session.begin_search("   "),
            Err(LocusError::EmptyQuery)
        ));
    }

    #[test]
    fn test_search_trims_term() {
        let mut session = Session::new();
        let req = session.begin_search("  TP53 ").unwrap();
        assert_eq!(req.gene_name, "TP53");
    }

    #[test]
    fn test_stale_search_response_discarded() {
        let mut session = Session::new();
        let first = session.begin_search("TP53").unwrap();
        let second = session.begin_search("BRCA1").unwrap();

        // The slow first response arrives after the second search started.
        assert!(!session.apply_associations(first.token, vec![record("old", 1, 0.5)]));
        assert!(session.dataset().is_empty());

        assert!(session.apply_associations(second.token, vec![record("new", 2, 0.5)]));
        assert_eq!(session.dataset().len(), 1);

        // Exons from the first search are likewise dropped.
        assert!(!session.apply_exons(
            first.token,
            vec![ExonRecord {
                start_position: 0,
                end_position: 10,
            }],
        ));
        assert!(session.exons().is_empty());
    }

    #[test]
    fn test_new_dataset_resets_view_state() {
        let mut session = loaded_session();
        session.zoom_in(800.0);
        let detail_req = session.select("v2", "ENSG00000141510").unwrap();
        assert!(session.apply_effect_detail(detail_req.token, detail_for(&detail_req)));

        let req = session.begin_search("BRCA1").unwrap();
        assert!(session.apply_associations(req.token, vec![record("b1", 5_000, 0.02)]));
        assert!(session.viewport().is_identity());
        assert_eq!(session.selection().current(), None);
        assert_eq!(session.detail(), None);
        assert!(session.exons().is_empty());
    }

    #[test]
    fn test_select_marks_exactly_one() {
        let mut session = loaded_session();
        session.select("v1", "ENSG00000141510").unwrap();
        session.select("v2", "ENSG00000141510").unwrap();
        assert!(session.selection().is_selected("v2"));
        assert!(!session.selection().is_selected("v1"));
        assert_eq!(session.selected_index(), Some(1));
    }

    #[test]
    fn test_select_unknown_id_is_noop() {
        let mut session = loaded_session();
        assert_eq!(session.select("nope", "ENSG00000141510"), None);
        assert_eq!(session.selection().current(), None);
    }

    #[test]
    fn test_select_issues_one_detail_request() {
        let mut session = loaded_session();
        let req = session.select("v2", "ENSG00000141510").unwrap();
        assert_eq!(req.variant_id, "v2");
        assert_eq!(req.gene_id, "ENSG00000141510");

        // Re-selecting issues a fresh token that outdates the first.
        let req2 = session.select("v1", "ENSG00000141510").unwrap();
        assert!(!session.apply_effect_detail(req.token, detail_for(&req)));
        assert_eq!(session.detail(), None);
        assert!(session.apply_effect_detail(req2.token, detail_for(&req2)));
        assert!(session.detail().is_some());
    }

    #[test]
    fn test_composed_scales_follow_viewport() {
        let mut session = loaded_session();
        let before = session.composed_scales(800.0, 400.0);
        assert_eq!(before.x.apply(100_000.0), 0.0);
        assert_eq!(before.x.apply(200_000.0), 800.0);

        session.zoom_in(800.0);
        let after = session.composed_scales(800.0, 400.0);
        let vp = *session.viewport();
        assert!((after.x.apply(100_000.0) - vp.translate_x()).abs() < 1e-9);
        // y is untouched by the x-only viewport.
        assert_eq!(before.y, after.y);
    }

    #[test]
    fn test_gene_label() {
        let session = loaded_session();
        assert_eq!(session.gene_label(), Some("TP53"));
        assert_eq!(Session::new().gene_label(), None);
    }
}
