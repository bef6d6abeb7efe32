use crate::extract::error::ExtractionError;
use crate::extract::traits::HasSource;
use log::info;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct XmlDataSource {
    pub source: PathBuf,
}

impl XmlDataSource {
    pub fn new(source: PathBuf) -> Self {
        Self { source }
    }

    /// Deserializes the whole document. The name of the root element is not checked.
    pub fn read<T: DeserializeOwned>(&self) -> Result<T, ExtractionError> {
        self.ensure_exists()?;
        let reader = BufReader::new(File::open(&self.source)?);
        Ok(quick_xml::de::from_reader(reader)?)
    }

    pub fn read_invoices(&self) -> Result<Vec<InvoiceElement>, ExtractionError> {
        let document: InvoiceDocument = self.read()?;
        info!(
            "Read {} invoices from {:?}",
            document.invoices.len(),
            self.source
        );
        Ok(document.invoices)
    }
}

impl HasSource for XmlDataSource {
    fn source(&self) -> &Path {
        &self.source
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct InvoiceDocument {
    #[serde(rename = "Invoice", default)]
    pub invoices: Vec<InvoiceElement>,
}

/// One `Invoice` element. Every child is optional, validation happens downstream.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct InvoiceElement {
    #[serde(rename = "OrderId", default)]
    pub order_id: Option<String>,
    #[serde(rename = "PersonId", default)]
    pub person_id: Option<String>,
    #[serde(rename = "OrderDate", default)]
    pub order_date: Option<String>,
    #[serde(rename = "TotalPrice", default)]
    pub total_price: Option<String>,
    #[serde(rename = "Orderline", alias = "OrderLine", default)]
    pub order_lines: Vec<OrderLineElement>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OrderLineElement {
    #[serde(rename = "productId", default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
}
