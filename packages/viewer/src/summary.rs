//! Dataset-level summary for display.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use turtle_map_records_models::{RecordKind, RecordStore};
use turtle_map_timeline::{CursorMode, max_cursor};

/// Record counts and time span of a loaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub sightings: usize,
    pub trends: usize,
    pub vessels: usize,
    pub min_date: NaiveDate,
    /// Date of the last sighting/trend day index, if representable.
    pub max_date: Option<NaiveDate>,
    pub max_time_index: i64,
    pub max_week_index: i64,
    /// Largest cursor for the session's cursor mode.
    pub max_cursor: f64,
}

impl DatasetSummary {
    #[must_use]
    pub fn of(store: &RecordStore, mode: CursorMode) -> Self {
        let metadata = store.metadata();

        Self {
            sightings: store.count(RecordKind::Sighting),
            trends: store.count(RecordKind::Trend),
            vessels: store.count(RecordKind::VesselPresence),
            min_date: metadata.min_date,
            max_date: metadata.date_for_day(metadata.max_time_index),
            max_time_index: metadata.max_time_index,
            max_week_index: metadata.max_week_index(),
            max_cursor: max_cursor(mode, metadata),
        }
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sightings:      {}", self.sightings)?;
        writeln!(f, "Trend points:   {}", self.trends)?;
        writeln!(f, "Vessel records: {}", self.vessels)?;
        match self.max_date {
            Some(max_date) => writeln!(f, "Date range:     {} to {max_date}", self.min_date)?,
            None => writeln!(f, "Date range:     from {}", self.min_date)?,
        }
        writeln!(
            f,
            "Days:           0..={} ({} weeks)",
            self.max_time_index,
            self.max_week_index + 1
        )
    }
}
