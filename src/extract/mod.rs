pub mod csv_data_source;
pub use csv_data_source::{CsvChunks, CsvDataSource, Separator};
pub mod error;
pub mod json_data_source;
pub use json_data_source::{JsonDataSource, JsonLayout};
pub mod traits;
pub mod xml_data_source;
pub use xml_data_source::{InvoiceElement, OrderLineElement, XmlDataSource};
