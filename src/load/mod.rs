pub mod batch;
pub use batch::{BatchLoader, BatchReport};
pub mod document;
pub mod error;
pub mod graph;
pub mod traits;
