use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocusError {
    /// The search box was submitted empty; no request is issued.
    #[error("please enter a gene name")]
    EmptyQuery,

    #[error("request failed: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
