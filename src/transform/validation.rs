use crate::extract::xml_data_source::{InvoiceElement, OrderLineElement};
use crate::transform::records::{Record, value_as_key};
use serde_json::{Number, Value};
use thiserror::Error;

const REQUIRED_ORDER_FIELDS: [&str; 4] = ["PersonId", "OrderDate", "TotalPrice", "Orderline"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderRejection {
    #[error("order has no OrderId")]
    MissingOrderId,
    #[error("order is missing {0:?}")]
    MissingFields(Vec<String>),
    #[error("TotalPrice is not numeric")]
    NonNumericTotal,
    #[error("OrderDate is not a string")]
    NonStringDate,
}

/// Keys an order by its `OrderId` and checks the fields every order document must carry.
pub fn validate_order(mut order: Record) -> Result<Record, OrderRejection> {
    let key = order
        .get("OrderId")
        .and_then(value_as_key)
        .filter(|key| !key.is_empty())
        .ok_or(OrderRejection::MissingOrderId)?;

    let missing: Vec<String> = REQUIRED_ORDER_FIELDS
        .iter()
        .filter(|field| !order.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(OrderRejection::MissingFields(missing));
    }
    if !order.get("TotalPrice").is_some_and(Value::is_number) {
        return Err(OrderRejection::NonNumericTotal);
    }
    if !order.get("OrderDate").is_some_and(Value::is_string) {
        return Err(OrderRejection::NonStringDate);
    }

    order.insert("_key".to_string(), Value::String(key));
    Ok(order)
}

/// Builds the invoice document, or `None` if the id, date or a numeric total is missing.
pub fn invoice_document(invoice: &InvoiceElement) -> Option<Record> {
    let order_id = non_blank(invoice.order_id.as_deref())?;
    let issued_date = non_blank(invoice.order_date.as_deref())?;
    let total = non_blank(invoice.total_price.as_deref())?
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)?;

    let mut document = Record::new();
    document.insert("_key".to_string(), Value::from(order_id));
    document.insert("InvoiceId".to_string(), Value::from(order_id));
    document.insert("OrderId".to_string(), Value::from(order_id));
    document.insert("IssuedDate".to_string(), Value::from(issued_date));
    document.insert("TotalAmount".to_string(), Value::Number(total));
    document.insert(
        "Orderline".to_string(),
        Value::Array(invoice.order_lines.iter().map(order_line).collect()),
    );
    Some(document)
}

fn order_line(line: &OrderLineElement) -> Value {
    let mut record = Record::new();
    let fields = [
        ("productId", &line.product_id),
        ("asin", &line.asin),
        ("title", &line.title),
        ("brand", &line.brand),
    ];
    for (name, value) in fields {
        if let Some(value) = non_blank(value.as_deref()) {
            record.insert(name.to_string(), Value::from(value));
        }
    }
    if let Some(price) = non_blank(line.price.as_deref()) {
        let price = price
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or_else(|| Value::from(price), Value::Number);
        record.insert("price".to_string(), price);
    }
    Value::Object(record)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[rstest]
    fn test_valid_order_is_keyed() {
        let order = record(json!({
            "OrderId": "016f6a4a-ec18-4885-b1c7-9bf2306c76d6",
            "PersonId": "10995116278711",
            "OrderDate": "2022-09-01",
            "TotalPrice": 723.88,
            "Orderline": []
        }));

        let validated = validate_order(order).unwrap();
        assert_eq!(validated["_key"], "016f6a4a-ec18-4885-b1c7-9bf2306c76d6");
    }

    #[rstest]
    #[case(json!({"PersonId": "1", "OrderDate": "2020-01-01", "TotalPrice": 1, "Orderline": []}), OrderRejection::MissingOrderId)]
    #[case(json!({"OrderId": "o", "OrderDate": "2020-01-01", "TotalPrice": 1}), OrderRejection::MissingFields(vec!["PersonId".to_string(), "Orderline".to_string()]))]
    #[case(json!({"OrderId": "o", "PersonId": "1", "OrderDate": "2020-01-01", "TotalPrice": "12", "Orderline": []}), OrderRejection::NonNumericTotal)]
    #[case(json!({"OrderId": "o", "PersonId": "1", "OrderDate": 20200101, "TotalPrice": 12, "Orderline": []}), OrderRejection::NonStringDate)]
    fn test_invalid_orders(#[case] order: Value, #[case] expected: OrderRejection) {
        assert_eq!(validate_order(record(order)).unwrap_err(), expected);
    }

    #[rstest]
    fn test_invoice_document() {
        let invoice = InvoiceElement {
            order_id: Some("o1".to_string()),
            person_id: Some("p1".to_string()),
            order_date: Some("2020-03-10".to_string()),
            total_price: Some(" 42.5 ".to_string()),
            order_lines: vec![OrderLineElement {
                product_id: Some("12".to_string()),
                price: Some("20".to_string()),
                ..Default::default()
            }],
        };

        let document = invoice_document(&invoice).unwrap();
        assert_eq!(
            Value::Object(document),
            json!({
                "_key": "o1",
                "InvoiceId": "o1",
                "OrderId": "o1",
                "IssuedDate": "2020-03-10",
                "TotalAmount": 42.5,
                "Orderline": [{"productId": "12", "price": 20.0}]
            })
        );
    }

    #[rstest]
    #[case(None, Some("1"))]
    #[case(Some("2020-01-01"), Some("abc"))]
    #[case(Some("2020-01-01"), None)]
    fn test_incomplete_invoice_is_dropped(
        #[case] order_date: Option<&str>,
        #[case] total_price: Option<&str>,
    ) {
        let invoice = InvoiceElement {
            order_id: Some("o1".to_string()),
            order_date: order_date.map(str::to_string),
            total_price: total_price.map(str::to_string),
            ..Default::default()
        };
        assert_eq!(invoice_document(&invoice), None);
    }
}
