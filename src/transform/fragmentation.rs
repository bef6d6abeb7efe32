//! Splitting a population into disjoint range-based fragments.
//!
//! A [`FragmentPlan`] is an ordered list of contiguous half-open bands
//! `[lower, upper)` covering the whole value domain. Rows whose value cannot be
//! read are assigned the plan's sentinel, which for every shipped plan lies in
//! the lowest band.

use crate::transform::data_processing::parsing::leading_date;
use crate::transform::error::TransformError;
use crate::transform::records::Record;
use chrono::NaiveDate;
use log::debug;
use polars::prelude::{BooleanChunked, DataFrame, DataType};
use serde_json::Value;
use std::fmt::Debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Band<T> {
    /// Name of the collection/class the band is loaded into.
    pub name: String,
    pub lower: Option<T>,
    pub upper: Option<T>,
}

impl<T: PartialOrd> Band<T> {
    pub fn new(name: &str, lower: Option<T>, upper: Option<T>) -> Self {
        Self {
            name: name.to_string(),
            lower,
            upper,
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.lower.as_ref().is_none_or(|lower| value >= lower)
            && self.upper.as_ref().is_none_or(|upper| value < upper)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentPlan<T> {
    pub name: String,
    pub column: String,
    bands: Vec<Band<T>>,
    sentinel: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameFragment {
    pub name: String,
    pub frame: DataFrame,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordFragment {
    pub name: String,
    pub records: Vec<Record>,
}

impl<T: PartialOrd + Clone + Debug> FragmentPlan<T> {
    /// Fails unless the bands are contiguous, non-empty and unbounded at both ends.
    pub fn new(
        name: &str,
        column: &str,
        bands: Vec<Band<T>>,
        sentinel: T,
    ) -> Result<Self, TransformError> {
        let invalid = |reason: String| TransformError::InvalidBands {
            plan: name.to_string(),
            reason,
        };

        let (first, last) = match (bands.first(), bands.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(invalid("no bands".to_string())),
        };
        if first.lower.is_some() {
            return Err(invalid(format!("band '{}' has a lower bound", first.name)));
        }
        if last.upper.is_some() {
            return Err(invalid(format!("band '{}' has an upper bound", last.name)));
        }
        for pair in bands.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            match (&left.upper, &right.lower) {
                (Some(upper), Some(lower)) if upper == lower => {}
                _ => {
                    return Err(invalid(format!(
                        "'{}' and '{}' are not contiguous",
                        left.name, right.name
                    )));
                }
            }
            if let (Some(lower), Some(upper)) = (&left.lower, &left.upper)
                && lower >= upper
            {
                return Err(invalid(format!("band '{}' is empty", left.name)));
            }
        }

        Ok(Self {
            name: name.to_string(),
            column: column.to_string(),
            bands,
            sentinel,
        })
    }

    pub fn bands(&self) -> &[Band<T>] {
        &self.bands
    }

    pub fn band_names(&self) -> Vec<&str> {
        self.bands.iter().map(|b| b.name.as_str()).collect()
    }

    /// Index of the band a value falls into. `None` values take the sentinel.
    pub fn band_index(&self, value: Option<&T>) -> usize {
        let value = value.unwrap_or(&self.sentinel);
        self.bands
            .iter()
            .position(|band| band.contains(value))
            // Unreachable for a validated plan, kept total for incomparable values like NaN.
            .unwrap_or(0)
    }

    /// Splits JSON records, reading the plan column through `read`.
    pub fn fragment_records<F>(&self, records: &[Record], read: F) -> Vec<RecordFragment>
    where
        F: Fn(&Value) -> Option<T>,
    {
        let mut fragments: Vec<RecordFragment> = self
            .bands
            .iter()
            .map(|band| RecordFragment {
                name: band.name.clone(),
                records: Vec::new(),
            })
            .collect();

        for record in records {
            let value = record.get(&self.column).and_then(&read);
            let idx = self.band_index(value.as_ref());
            fragments[idx].records.push(record.clone());
        }

        for fragment in &fragments {
            debug!(
                "Fragment '{}' of plan '{}' holds {} records.",
                fragment.name,
                self.name,
                fragment.records.len()
            );
        }
        fragments
    }
}

impl FragmentPlan<f64> {
    /// Splits a frame on a numeric (or numeric-looking string) column.
    pub fn fragment_frame(&self, df: &DataFrame) -> Result<Vec<FrameFragment>, TransformError> {
        let column = df
            .column(&self.column)
            .map_err(|_| TransformError::MissingColumn {
                table: self.name.clone(),
                column: self.column.clone(),
            })?;
        let numeric = column.cast(&DataType::Float64)?;
        let indices: Vec<usize> = numeric
            .f64()?
            .iter()
            .map(|value| self.band_index(value.filter(|v| !v.is_nan()).as_ref()))
            .collect();

        let mut fragments = Vec::with_capacity(self.bands.len());
        for (band_idx, band) in self.bands.iter().enumerate() {
            let mask: BooleanChunked = indices.iter().map(|idx| Some(*idx == band_idx)).collect();
            let frame = df.filter(&mask)?;
            debug!(
                "Fragment '{}' of plan '{}' holds {} rows.",
                band.name,
                self.name,
                frame.height()
            );
            fragments.push(FrameFragment {
                name: band.name.clone(),
                frame,
            });
        }
        Ok(fragments)
    }
}

/// Reads the calendar day a JSON value starts with.
pub fn read_date(value: &Value) -> Option<NaiveDate> {
    value.as_str().and_then(leading_date)
}

/// Reads a JSON number, or a string holding one.
pub fn read_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
