use crate::transform::error::TransformError;
use polars::prelude::{AnyValue, Column, DataFrame};
use serde_json::{Map, Number, Value};

/// One document, vertex or relation as it is sent to a backend.
pub type Record = Map<String, Value>;

/// Turns every row of `df` into a JSON object, keeping the column order.
pub fn frame_to_records(df: &DataFrame) -> Result<Vec<Record>, TransformError> {
    let columns = df.get_columns();
    let mut records = Vec::with_capacity(df.height());

    for idx in 0..df.height() {
        let mut record = Record::new();
        for column in columns {
            record.insert(column.name().to_string(), any_value_to_json(column.get(idx)?));
        }
        records.push(record);
    }
    Ok(records)
}

/// The textual form of a cell, `None` for nulls.
pub fn cell_as_string(column: &Column, idx: usize) -> Result<Option<String>, TransformError> {
    Ok(match column.get(idx)? {
        AnyValue::Null => None,
        AnyValue::String(s) => Some(s.to_string()),
        AnyValue::StringOwned(s) => Some(s.to_string()),
        other => Some(other.to_string()),
    })
}

/// The textual form of a JSON value the way natural keys are compared: trimmed, numbers unquoted.
pub fn value_as_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::Int32(v) => Value::from(v),
        AnyValue::Int64(v) => Value::from(v),
        AnyValue::UInt32(v) => Value::from(v),
        AnyValue::UInt64(v) => Value::from(v),
        AnyValue::Float32(v) => float_to_json(v as f64),
        AnyValue::Float64(v) => float_to_json(v),
        other => Value::String(other.to_string()),
    }
}

fn float_to_json(value: f64) -> Value {
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
