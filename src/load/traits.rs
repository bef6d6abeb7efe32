use crate::load::error::LoadError;
use crate::transform::records::Record;
use serde_json::Value;
use std::fmt::Debug;

/// Accepts one chunk of records for a named collection or class.
pub trait BatchSink: Debug {
    /// Returns the number of records the backend stored.
    fn submit(&self, target: &str, chunk: &[Record]) -> Result<usize, LoadError>;
}

/// Outcome of one insert-many call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub created: usize,
    /// Messages of the documents the backend refused.
    pub errors: Vec<String>,
}

/// The collection level operations of a document database.
pub trait DocumentStore: Debug {
    fn truncate(&self, collection: &str) -> Result<(), LoadError>;

    fn count(&self, collection: &str) -> Result<u64, LoadError>;

    fn insert_many(
        &self,
        collection: &str,
        documents: &[Record],
        overwrite: bool,
    ) -> Result<InsertSummary, LoadError>;
}

/// Runs a command script against a graph database.
pub trait CommandExecutor: Debug {
    /// Returns the parsed response body. Backend-reported errors are `Err`.
    fn execute(&self, command: &str, transaction: bool) -> Result<Value, LoadError>;
}
