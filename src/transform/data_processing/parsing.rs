use crate::constants::{DATE_FORMATS, DATETIME_FORMATS, OUTPUT_DATETIME_FORMAT};
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

fn try_parse<T, F>(date_str: &str, formats: &[&str], parser: F) -> Option<T>
where
    F: Fn(&str, &str) -> Option<T>,
{
    for format in formats {
        match parser(date_str, format) {
            Some(value) => {
                return Some(value);
            }
            _ => {
                debug!("Failed to cast {date_str} to {format:?}");
                continue;
            }
        }
    }
    None
}

pub fn try_parse_string_date(date_str: &str) -> Option<NaiveDate> {
    try_parse(date_str.trim(), DATE_FORMATS, |s, fmt| {
        NaiveDate::parse_from_str(s, fmt).ok()
    })
}

pub fn try_parse_string_datetime(datetime_str: &str) -> Option<NaiveDateTime> {
    try_parse(datetime_str.trim(), DATETIME_FORMATS, |s, fmt| {
        NaiveDateTime::parse_from_str(s, fmt).ok()
    })
}

/// Parses either a datetime or a plain date (taken as midnight).
pub fn try_parse_date_or_datetime(raw: &str) -> Option<NaiveDateTime> {
    try_parse_string_datetime(raw).or_else(|| {
        try_parse_string_date(raw).and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

/// Re-renders a raw date or datetime as `YYYY-MM-DD HH:MM:SS`.
pub fn normalize_datetime(raw: &str) -> Option<String> {
    try_parse_date_or_datetime(raw).map(|dt| dt.format(OUTPUT_DATETIME_FORMAT).to_string())
}

/// The calendar day a raw value starts with. Accepts full datetimes as well as dates.
pub fn leading_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Some(prefix) = trimmed.get(..10)
        && let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
    {
        return Some(date);
    }
    try_parse_date_or_datetime(trimmed).map(|dt| dt.date())
}
