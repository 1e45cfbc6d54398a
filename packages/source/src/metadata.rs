//! Dataset metadata document parsing.

use serde::Deserialize;
use turtle_map_records_models::DatasetMetadata;

use crate::SourceError;
use crate::parsing::parse_iso_date;

/// Metadata exactly as it appears on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    min_date: String,
    max_time_index: i64,
}

/// Parses the metadata JSON document (`minDate`, `maxTimeIndex`).
///
/// # Errors
///
/// Returns [`SourceError::Json`] for malformed JSON and
/// [`SourceError::Metadata`] when `minDate` is not a date, or when
/// `maxTimeIndex` is negative or lands past the last representable date.
pub fn parse_metadata(text: &str) -> Result<DatasetMetadata, SourceError> {
    let raw: RawMetadata = serde_json::from_str(text)?;

    let min_date = parse_iso_date(&raw.min_date).ok_or_else(|| SourceError::Metadata {
        message: format!("minDate {:?} is not an ISO date", raw.min_date),
    })?;

    if raw.max_time_index < 0 {
        return Err(SourceError::Metadata {
            message: format!("maxTimeIndex {} is negative", raw.max_time_index),
        });
    }

    let metadata = DatasetMetadata {
        min_date,
        max_time_index: raw.max_time_index,
    };
    if metadata.date_for_day(metadata.max_time_index).is_none() {
        return Err(SourceError::Metadata {
            message: format!(
                "maxTimeIndex {} is out of range for minDate {min_date}",
                raw.max_time_index
            ),
        });
    }

    Ok(metadata)
}
