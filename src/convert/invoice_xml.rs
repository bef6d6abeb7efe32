use crate::convert::error::ConvertError;
use crate::extract::json_data_source::{JsonDataSource, JsonLayout};
use crate::transform::records::Record;
use log::info;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const LINE_FIELDS: [&str; 4] = ["SKU", "PRODUCT_ID", "TITLE", "PRICE"];

/// Rewrites JSON-lines orders as an `Invoices` XML document.
/// Returns the number of invoices written.
pub fn convert_orders(input: &Path, output: &Path) -> Result<usize, ConvertError> {
    let orders = JsonDataSource::new(input.to_path_buf(), JsonLayout::Lines).read_records()?;

    let mut writer = Writer::new_with_indent(BufWriter::new(File::create(output)?), b' ', 2);
    write_invoices(&mut writer, &orders)?;
    writer.into_inner().flush()?;

    info!("Wrote {} invoices to {output:?}.", orders.len());
    Ok(orders.len())
}

fn write_invoices<W: Write>(writer: &mut Writer<W>, orders: &[Record]) -> io::Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer
        .create_element("Invoices")
        .write_inner_content(|writer| {
            for order in orders {
                write_invoice(writer, order)?;
            }
            Ok(())
        })?;
    Ok(())
}

fn write_invoice<W: Write>(writer: &mut Writer<W>, order: &Record) -> io::Result<()> {
    writer.create_element("Invoice").write_inner_content(|writer| {
        for field in ["ORDER_ID", "CUSTOMER_ID", "ORDER_DATE", "TOTAL_PRICE"] {
            write_text(writer, field, &scalar_text(order.get(field)))?;
        }
        let lines = order
            .get("ORDER_LINE")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for line in lines {
            writer.create_element("ORDER_LINE").write_inner_content(|writer| {
                for field in LINE_FIELDS {
                    write_text(writer, field, &scalar_text(line.get(field)))?;
                }
                write_text(writer, "VENDOR_ID", &vendor_text(line.get("VENDOR_ID")))
            })?;
        }
        Ok(())
    })?;
    Ok(())
}

fn write_text<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

fn scalar_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Empty, zero and missing vendors are written as `NULL`.
fn vendor_text(value: Option<&Value>) -> String {
    let text = scalar_text(value);
    let blank = match value {
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        _ => text.is_empty(),
    };
    if blank { "NULL".to_string() } else { text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::xml_data_source::XmlDataSource;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use serde::Deserialize;
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temporary directory")
    }

    const ORDERS: &str = r#"{"ORDER_ID": "o1", "CUSTOMER_ID": "c1", "ORDER_DATE": "2020-03-11", "TOTAL_PRICE": 12.5, "ORDER_LINE": [{"SKU": "s1", "PRODUCT_ID": "p1", "TITLE": "Mug & Cup", "PRICE": 12.5, "VENDOR_ID": null}]}
{"ORDER_ID": "o2", "CUSTOMER_ID": "c2", "ORDER_DATE": "2021-01-01", "TOTAL_PRICE": 3, "ORDER_LINE": []}
"#;

    #[derive(Debug, Deserialize)]
    struct Invoices {
        #[serde(rename = "Invoice", default)]
        invoices: Vec<Invoice>,
    }

    #[derive(Debug, Deserialize)]
    struct Invoice {
        #[serde(rename = "ORDER_ID")]
        order_id: String,
        #[serde(rename = "ORDER_LINE", default)]
        lines: Vec<Line>,
    }

    #[derive(Debug, Deserialize)]
    struct Line {
        #[serde(rename = "TITLE")]
        title: String,
        #[serde(rename = "VENDOR_ID")]
        vendor_id: String,
    }

    #[rstest]
    fn test_convert_orders(temp_dir: TempDir) {
        let input = temp_dir.path().join("Order.json");
        let output = temp_dir.path().join("Invoice.xml");
        fs::write(&input, ORDERS).unwrap();

        assert_eq!(convert_orders(&input, &output).unwrap(), 2);

        let xml = fs::read_to_string(&output).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(xml.contains("\n  <Invoice>\n    <ORDER_ID>o1</ORDER_ID>"));
        assert!(xml.contains("<TOTAL_PRICE>12.5</TOTAL_PRICE>"));

        let parsed: Invoices = XmlDataSource::new(output).read().unwrap();
        assert_eq!(parsed.invoices.len(), 2);
        assert_eq!(parsed.invoices[1].order_id, "o2");
        assert_eq!(parsed.invoices[0].lines[0].title, "Mug & Cup");
        assert_eq!(parsed.invoices[0].lines[0].vendor_id, "NULL");
    }

    #[rstest]
    #[case(None, "NULL")]
    #[case(Some(Value::from(0)), "NULL")]
    #[case(Some(Value::from("")), "NULL")]
    #[case(Some(Value::from(17)), "17")]
    #[case(Some(Value::from("v9")), "v9")]
    fn test_vendor_text(#[case] value: Option<Value>, #[case] expected: &str) {
        assert_eq!(vendor_text(value.as_ref()), expected);
    }
}
