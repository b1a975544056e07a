//! Core engine of the eQTL locus browser: coordinate mapping, viewport
//! zoom/pan, selection and sort state, layered draw-instruction building,
//! and CSV export. Everything here is DOM- and network-free; the viewer
//! crate is a thin shell that executes draw ops and runs the fetches.

pub mod error;
pub mod export;
pub mod scale;
pub mod scene;
pub mod selection;
pub mod session;
pub mod table;
pub mod types;
pub mod viewport;

use error::LocusError;
use types::{AssociationRecord, EffectSizeDetail, ExonRecord};

/// Decode an `/associations/` response body.
pub fn parse_associations(json: &str) -> Result<Vec<AssociationRecord>, LocusError> {
    Ok(serde_json::from_str(json)?)
}

/// Decode an `/exons/{gene_id}` response body.
pub fn parse_exons(json: &str) -> Result<Vec<ExonRecord>, LocusError> {
    Ok(serde_json::from_str(json)?)
}

/// Decode an `/effect_size/` response body.
pub fn parse_effect_size(json: &str) -> Result<EffectSizeDetail, LocusError> {
    Ok(serde_json::from_str(json)?)
}
