use crate::load::error::LoadError;
use crate::load::traits::{BatchSink, DocumentStore};
use crate::transform::records::Record;
use log::{info, warn};

/// Sends each chunk as one insert-many call.
///
/// A chunk with refused documents counts as failed even when others in it were stored.
#[derive(Debug)]
pub struct DocumentBatchSink<'a, S: ?Sized> {
    store: &'a S,
    overwrite: bool,
}

impl<'a, S: DocumentStore + ?Sized> DocumentBatchSink<'a, S> {
    pub fn new(store: &'a S, overwrite: bool) -> Self {
        Self { store, overwrite }
    }
}

impl<S: DocumentStore + ?Sized> BatchSink for DocumentBatchSink<'_, S> {
    fn submit(&self, target: &str, chunk: &[Record]) -> Result<usize, LoadError> {
        let summary = self.store.insert_many(target, chunk, self.overwrite)?;
        if summary.errors.is_empty() {
            return Ok(summary.created);
        }

        for message in summary.errors.iter().take(3) {
            warn!("'{target}' refused a document: {message}");
        }
        Err(LoadError::PartiallyStored {
            target: target.to_string(),
            stored: summary.created,
            refused: summary.errors.len(),
        })
    }
}

/// Truncates `collection` unless it is already empty.
pub fn clear_collection<S: DocumentStore + ?Sized>(
    store: &S,
    collection: &str,
) -> Result<(), LoadError> {
    if store.count(collection)? > 0 {
        store.truncate(collection)?;
        info!("Removed every document from '{collection}'.");
    } else {
        info!("Collection '{collection}' is already empty.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::batch::{BatchLoader, BatchReport};
    use crate::load::traits::InsertSummary;
    use pretty_assertions::assert_eq;
    use crate::test_suite::mocks::MockDocumentStore;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn test_clear_skips_empty_collections() {
        let mut store = MockDocumentStore::new();
        store
            .expect_count()
            .withf(|collection| collection == "Tag")
            .returning(|_| Ok(0));
        store.expect_truncate().never();

        clear_collection(&store, "Tag").unwrap();
    }

    #[rstest]
    fn test_clear_truncates_populated_collections() {
        let mut store = MockDocumentStore::new();
        store.expect_count().returning(|_| Ok(4));
        store
            .expect_truncate()
            .withf(|collection| collection == "Vendor")
            .times(1)
            .returning(|_| Ok(()));

        clear_collection(&store, "Vendor").unwrap();
    }

    fn orders(keys: &[&str]) -> Vec<Record> {
        keys.iter()
            .map(|key| json!({"_key": key}).as_object().cloned().unwrap())
            .collect()
    }

    #[rstest]
    fn test_refused_documents_fail_the_chunk() {
        let mut store = MockDocumentStore::new();
        store
            .expect_insert_many()
            .withf(|collection, documents, overwrite| {
                collection == "Order" && documents.len() == 2 && *overwrite
            })
            .returning(|_, _, _| {
                Ok(InsertSummary {
                    created: 1,
                    errors: vec!["duplicate".to_string()],
                })
            });

        let result = DocumentBatchSink::new(&store, true).submit("Order", &orders(&["a", "b"]));

        assert!(matches!(
            result,
            Err(LoadError::PartiallyStored { stored: 1, refused: 1, .. })
        ));
    }

    #[rstest]
    fn test_partially_refused_chunk_still_counts_stored_documents() {
        let mut store = MockDocumentStore::new();
        store.expect_insert_many().returning(|_, _, _| {
            Ok(InsertSummary {
                created: 2,
                errors: vec!["unique constraint violated".to_string()],
            })
        });

        let sink = DocumentBatchSink::new(&store, false);
        let report = BatchLoader::new(10).load(&sink, "Order", &orders(&["a", "b", "c"]));

        assert_eq!(
            report,
            BatchReport {
                submitted: 3,
                committed: 2,
                succeeded_batches: 0,
                failed_batches: 1,
            }
        );
    }
}
