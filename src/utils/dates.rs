//! Calendar-day and timestamp handling for health records.
//!
//! All day arithmetic is naive: "today" is the server's local calendar day
//! and stored timestamps carry no offset.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

use crate::models::error::AppError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parse a `YYYY-MM-DD` calendar day.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        AppError::Validation(format!("{} must be a date in YYYY-MM-DD format", field))
    })
}

/// Parse an RFC 3339 or naive ISO-8601 timestamp.
///
/// Offsets are normalised to UTC and then dropped.
pub fn parse_timestamp(field: &str, value: &str) -> Result<NaiveDateTime, AppError> {
    let value = value.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.naive_utc());
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "{} must be an ISO-8601 timestamp such as 2024-01-01T22:00",
                field
            ))
        })
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
