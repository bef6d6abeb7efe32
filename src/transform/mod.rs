pub mod data_processing;
pub mod error;
pub mod fragmentation;
pub use fragmentation::{Band, FragmentPlan};
pub mod records;
pub use records::Record;
pub mod schema;
pub use schema::{Coercion, EntitySchema, FieldSpec, KeySpec};
pub mod validation;
