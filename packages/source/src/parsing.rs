//! Shared field parsing for dataset rows.
//!
//! Dates and numeric cells are parsed leniently: surrounding whitespace is
//! ignored and ISO datetimes are accepted wherever a date is expected.

use chrono::{NaiveDate, NaiveDateTime};

/// Parses an ISO calendar date, or an ISO datetime truncated to its date.
#[must_use]
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.date());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.date());
    }
    None
}

/// Parses a coordinate cell, yielding `NaN` when the cell is not numeric.
#[must_use]
pub fn parse_coordinate_lenient(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Parses a numeric cell that must be finite.
#[must_use]
pub fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses an integer day index. Integral decimals such as `"4.0"` are
/// accepted; fractional or out-of-range values are not.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn parse_time_index(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(index) = s.parse::<i64>() {
        return Some(index);
    }
    let value = s.parse::<f64>().ok()?;
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then(|| value as i64)
}

/// Whether an `is_trend` cell means "trend" (case-insensitive `"true"`).
#[must_use]
pub fn parse_is_trend(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("true")
}
