use crate::extract::error::ExtractionError;
use crate::transform::error::TransformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("Request to {url} failed with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("Backend rejected the batch for '{target}': {reason}")]
    BatchRejected { target: String, reason: String },
    #[error("'{target}' refused {refused} documents of the batch, {stored} were stored")]
    PartiallyStored {
        target: String,
        stored: usize,
        refused: usize,
    },
    #[error("Unexpected response from backend: {0}")]
    MalformedResponse(String),
    #[error("Edge class '{edge_class}' references unknown {class} '{key}'")]
    UnresolvedEndpoint {
        edge_class: String,
        class: String,
        key: String,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl LoadError {
    /// Records the backend kept although the batch as a whole failed.
    pub fn stored(&self) -> usize {
        match self {
            LoadError::PartiallyStored { stored, .. } => *stored,
            _ => 0,
        }
    }
}
