use crate::transform::data_processing::parsing::normalize_datetime;
use crate::transform::error::TransformError;
use log::debug;
use polars::prelude::{Column, DataType, PlSmallStr, StringChunked};

fn string_values<'a>(
    column: &'a Column,
    to: DataType,
) -> Result<&'a StringChunked, TransformError> {
    column.str().map_err(|_err| TransformError::CastingError {
        col_name: column.name().to_string(),
        from: column.dtype().clone(),
        to,
    })
}

/// Copies a string column under a new name, optionally trimming. Blank cells become null.
pub fn coerce_text(column: &Column, target: &str, trim: bool) -> Result<Column, TransformError> {
    let values: Vec<Option<String>> = string_values(column, DataType::String)?
        .iter()
        .map(|opt| {
            opt.map(|raw| if trim { raw.trim() } else { raw })
                .filter(|raw| !raw.is_empty())
                .map(str::to_string)
        })
        .collect();

    Ok(Column::new(PlSmallStr::from(target), values))
}

/// Parses integers. Values such as `"12.0"` are accepted, unparseable ones fall back to `default`.
pub fn coerce_integer(
    column: &Column,
    target: &str,
    default: Option<i64>,
) -> Result<Column, TransformError> {
    let mut failures = 0usize;
    let values: Vec<Option<i64>> = string_values(column, DataType::Int64)?
        .iter()
        .map(|opt| match opt.and_then(parse_integer) {
            Some(value) => Some(value),
            None => {
                failures += 1;
                default
            }
        })
        .collect();

    if failures > 0 {
        debug!(
            "Coerced {failures} unparseable values in column '{}' to {default:?}.",
            column.name()
        );
    }
    Ok(Column::new(PlSmallStr::from(target), values))
}

/// Parses floats. Unparseable values become null.
pub fn coerce_float(column: &Column, target: &str) -> Result<Column, TransformError> {
    let values: Vec<Option<f64>> = string_values(column, DataType::Float64)?
        .iter()
        .map(|opt| opt.and_then(|raw| raw.trim().parse::<f64>().ok()))
        .map(|value| value.filter(|v| v.is_finite()))
        .collect();

    Ok(Column::new(PlSmallStr::from(target), values))
}

/// Normalises dates and datetimes to `YYYY-MM-DD HH:MM:SS`. Unparseable values become null.
pub fn coerce_datetime(column: &Column, target: &str) -> Result<Column, TransformError> {
    let values: Vec<Option<String>> = string_values(column, DataType::String)?
        .iter()
        .map(|opt| opt.and_then(normalize_datetime))
        .collect();

    Ok(Column::new(PlSmallStr::from(target), values))
}

/// Replaces null or blank cells with `fill`.
pub fn fill_missing(column: &Column, target: &str, fill: &str) -> Result<Column, TransformError> {
    let values: Vec<String> = string_values(column, DataType::String)?
        .iter()
        .map(|opt| match opt {
            Some(raw) if !raw.trim().is_empty() => raw.to_string(),
            _ => fill.to_string(),
        })
        .collect();

    Ok(Column::new(PlSmallStr::from(target), values))
}

/// Strips `ch` from both ends of every value, then surrounding whitespace.
pub fn strip_chars(column: &Column, target: &str, ch: char) -> Result<Column, TransformError> {
    let values: Vec<Option<String>> = string_values(column, DataType::String)?
        .iter()
        .map(|opt| opt.map(|raw| raw.trim().trim_matches(ch).trim().to_string()))
        .collect();

    Ok(Column::new(PlSmallStr::from(target), values))
}

/// Prepends `prefix` to every non-null value, e.g. `Person/` to build a document handle.
pub fn prefix_values(
    column: &Column,
    target: &str,
    prefix: &str,
) -> Result<Column, TransformError> {
    let values: Vec<Option<String>> = string_values(column, DataType::String)?
        .iter()
        .map(|opt| opt.map(|raw| format!("{prefix}{}", raw.trim())))
        .collect();

    Ok(Column::new(PlSmallStr::from(target), values))
}

fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .map(|v| v as i64)
}
