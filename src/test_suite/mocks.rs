use crate::load::error::LoadError;
use crate::load::traits::{CommandExecutor, DocumentStore, InsertSummary};
use crate::transform::records::Record;
use mockall::mock;
use serde_json::Value;
use std::fmt::Debug;

mock! {
    pub(crate) CommandExecutor {}

    impl CommandExecutor for CommandExecutor {
        fn execute(&self, command: &str, transaction: bool) -> Result<Value, LoadError>;
    }

    impl Debug for CommandExecutor {
        fn fmt<'a>(&self, f: &mut std::fmt::Formatter<'a>) -> std::fmt::Result;
    }
}

mock! {
    pub(crate) DocumentStore {}

    impl DocumentStore for DocumentStore {
        fn truncate(&self, collection: &str) -> Result<(), LoadError>;

        fn count(&self, collection: &str) -> Result<u64, LoadError>;

        fn insert_many(
            &self,
            collection: &str,
            documents: &[Record],
            overwrite: bool,
        ) -> Result<InsertSummary, LoadError>;
    }

    impl Debug for DocumentStore {
        fn fmt<'a>(&self, f: &mut std::fmt::Formatter<'a>) -> std::fmt::Result;
    }
}
