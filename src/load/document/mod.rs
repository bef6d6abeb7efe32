pub mod arango_client;
pub use arango_client::DocumentClient;
pub mod sink;
pub use sink::{DocumentBatchSink, clear_collection};
