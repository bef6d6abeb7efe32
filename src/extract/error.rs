use polars::prelude::PolarsError;
use quick_xml::DeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Source file {0} does not exist.")]
    MissingFile(PathBuf),
    #[error("Source file {0} has no header row.")]
    MissingHeader(PathBuf),
    #[error("Expected a JSON array of objects in {0}.")]
    NotAJsonArray(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Xml(#[from] DeError),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}
