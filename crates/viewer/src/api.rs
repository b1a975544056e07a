use gloo::net::http::Request;

use locus_core::error::LocusError;
use locus_core::types::{AssociationRecord, EffectSizeDetail, ExonRecord};

pub const API_BASE_URL: &str = "http://localhost:8001";

/// Bulk-query significance cutoff, matching the backend's default view.
pub const P_VALUE_THRESHOLD: f64 = 0.05;

pub async fn fetch_associations(gene_name: &str) -> Result<Vec<AssociationRecord>, LocusError> {
    let url = format!(
        "{}/associations/?gene_name={}&p_value_threshold={}",
        API_BASE_URL,
        encode(gene_name),
        P_VALUE_THRESHOLD
    );
    locus_core::parse_associations(&get_text(&url).await?)
}

pub async fn fetch_exons(gene_id: &str) -> Result<Vec<ExonRecord>, LocusError> {
    let url = format!("{}/exons/{}", API_BASE_URL, encode(gene_id));
    locus_core::parse_exons(&get_text(&url).await?)
}

pub async fn fetch_effect_size(
    variant_id: &str,
    gene_id: &str,
) -> Result<EffectSizeDetail, LocusError> {
    let url = format!(
        "{}/effect_size/?variant_id={}&gene_id={}",
        API_BASE_URL,
        encode(variant_id),
        encode(gene_id)
    );
    locus_core::parse_effect_size(&get_text(&url).await?)
}

async fn get_text(url: &str) -> Result<String, LocusError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| LocusError::Network(e.to_string()))?;
    if !resp.ok() {
        return Err(LocusError::Network(format!("HTTP {}", resp.status())));
    }
    resp.text()
        .await
        .map_err(|e| LocusError::Network(e.to_string()))
}

fn encode(value: &str) -> String {
    js_sys::encode_uri_component(value).into()
}
