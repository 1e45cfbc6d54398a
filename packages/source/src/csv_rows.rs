//! Positional CSV parsing for sighting and vessel files.
//!
//! The header row is skipped and columns are read by position, so header
//! spelling does not matter.

use turtle_map_records_models::{TurtleRecord, VesselRecord};

use crate::SourceError;
use crate::load::RowReport;
use crate::parsing::{
    parse_coordinate_lenient, parse_finite, parse_is_trend, parse_iso_date, parse_time_index,
};

// Sightings: latitude, longitude, time_index, is_trend
const TURTLE_LAT: usize = 0;
const TURTLE_LON: usize = 1;
const TURTLE_TIME_INDEX: usize = 2;
const TURTLE_IS_TREND: usize = 3;

// Vessels: latitude, longitude, date, id, presence_hours
const VESSEL_LAT: usize = 0;
const VESSEL_LON: usize = 1;
const VESSEL_DATE: usize = 2;
const VESSEL_PRESENCE_HOURS: usize = 4;

fn reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes())
}

/// Parses the sightings/trends CSV.
///
/// Non-numeric coordinates are kept as `NaN`; such records stay in the
/// store but never match a proximity check. Rows without an integer time
/// index are dropped.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if the file cannot be read as CSV.
pub fn parse_turtle_csv(text: &str) -> Result<(Vec<TurtleRecord>, RowReport), SourceError> {
    let mut records = Vec::new();
    let mut report = RowReport::default();
    let mut nan_rows: u64 = 0;

    for (line, result) in reader(text).records().enumerate() {
        let row = result?;
        let field = |i: usize| row.get(i).unwrap_or("");

        let Some(time_index) = parse_time_index(field(TURTLE_TIME_INDEX)) else {
            log::warn!(
                "Dropping sighting row {}: time index {:?} is not an integer",
                line + 2,
                field(TURTLE_TIME_INDEX)
            );
            report.dropped += 1;
            continue;
        };

        let record = TurtleRecord {
            latitude: parse_coordinate_lenient(field(TURTLE_LAT)),
            longitude: parse_coordinate_lenient(field(TURTLE_LON)),
            time_index,
            is_trend: parse_is_trend(field(TURTLE_IS_TREND)),
        };

        if record.latitude.is_nan() || record.longitude.is_nan() {
            nan_rows += 1;
        }

        records.push(record);
        report.accepted += 1;
    }

    if nan_rows > 0 {
        log::warn!("{nan_rows} sighting rows have non-numeric coordinates");
    }

    Ok((records, report))
}

/// Parses the vessel presence CSV.
///
/// Rows whose coordinates, date, or presence hours fail to parse are
/// dropped, as are rows with negative presence hours. The `id` column is
/// ignored.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if the file cannot be read as CSV.
pub fn parse_vessel_csv(text: &str) -> Result<(Vec<VesselRecord>, RowReport), SourceError> {
    let mut records = Vec::new();
    let mut report = RowReport::default();

    for result in reader(text).records() {
        let row = result?;

        let parsed = parse_vessel_row(&row);

        if let Some(record) = parsed {
            records.push(record);
            report.accepted += 1;
        } else {
            report.dropped += 1;
        }
    }

    if report.dropped > 0 {
        log::debug!("Dropped {} malformed vessel rows", report.dropped);
    }

    Ok((records, report))
}

fn parse_vessel_row(row: &csv::StringRecord) -> Option<VesselRecord> {
    let field = |i: usize| row.get(i).unwrap_or("");

    Some(VesselRecord {
        latitude: parse_finite(field(VESSEL_LAT))?,
        longitude: parse_finite(field(VESSEL_LON))?,
        date: parse_iso_date(field(VESSEL_DATE))?,
        presence_hours: parse_finite(field(VESSEL_PRESENCE_HOURS)).filter(|h| *h >= 0.0)?,
    })
}
