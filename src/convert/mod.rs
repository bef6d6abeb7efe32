//! One-shot file rewrites that prepare the dataset; not part of a load run.

pub mod error;
pub mod feedback_fixer;
pub use feedback_fixer::{FixReport, fix_feedback};
pub mod invoice_xml;
pub use invoice_xml::convert_orders;
