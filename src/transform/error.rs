use polars::error::PolarsError;
use polars::prelude::DataType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Column '{column}' not found in table '{table}'")]
    MissingColumn { table: String, column: String },
    #[error("Table '{table}' has {found} columns, expected {expected}")]
    UnexpectedWidth {
        table: String,
        found: usize,
        expected: usize,
    },
    #[error("Unable to cast column '{col_name}' from type '{from}' to '{to}'")]
    CastingError {
        col_name: String,
        from: DataType,
        to: DataType,
    },
    #[error("Fragment plan '{plan}' is invalid: {reason}")]
    InvalidBands { plan: String, reason: String },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}
