#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Point record types and the in-memory record store.
//!
//! Every record the map can show is a point in WGS84 degrees tagged with a
//! day offset from the dataset's reference date. Turtle sightings and
//! predicted trend points carry that offset directly; vessel presence
//! records carry a calendar date that is converted on demand.

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The three classes of point record shown on the map.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecordKind {
    /// An observed animal occurrence.
    Sighting,
    /// A model-predicted or interpolated path point.
    Trend,
    /// Hours of vessel presence at a location on a given date.
    VesselPresence,
}

impl RecordKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Sighting, Self::Trend, Self::VesselPresence]
    }
}

/// Shared shape of every record: a position plus a day index.
pub trait PointRecord {
    /// Latitude in degrees.
    fn latitude(&self) -> f64;

    /// Longitude in degrees.
    fn longitude(&self) -> f64;

    /// Day offset from `min_date`.
    ///
    /// Records that store the offset natively ignore `min_date`.
    fn time_index(&self, min_date: NaiveDate) -> i64;

    /// Which layer this record belongs to.
    fn kind(&self) -> RecordKind;
}

/// A turtle sighting or trend point from the sightings CSV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurtleRecord {
    /// Latitude in degrees. `NaN` if the source cell was not numeric.
    pub latitude: f64,
    /// Longitude in degrees. `NaN` if the source cell was not numeric.
    pub longitude: f64,
    /// Day offset from the dataset reference date. May be negative.
    pub time_index: i64,
    /// `true` for predicted trend points, `false` for observed sightings.
    pub is_trend: bool,
}

impl TurtleRecord {
    /// Creates an observed sighting.
    #[must_use]
    pub const fn sighting(latitude: f64, longitude: f64, time_index: i64) -> Self {
        Self {
            latitude,
            longitude,
            time_index,
            is_trend: false,
        }
    }

    /// Creates a predicted trend point.
    #[must_use]
    pub const fn trend(latitude: f64, longitude: f64, time_index: i64) -> Self {
        Self {
            latitude,
            longitude,
            time_index,
            is_trend: true,
        }
    }
}

impl PointRecord for TurtleRecord {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }

    fn time_index(&self, _min_date: NaiveDate) -> i64 {
        self.time_index
    }

    fn kind(&self) -> RecordKind {
        if self.is_trend {
            RecordKind::Trend
        } else {
            RecordKind::Sighting
        }
    }
}

/// A vessel presence row from the vessel CSV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselRecord {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Calendar date of the presence observation.
    pub date: NaiveDate,
    /// Hours of presence. Finite and non-negative; used as marker radius
    /// scale and heatmap weight.
    pub presence_hours: f64,
}

impl VesselRecord {
    /// Whole days between `min_date` and this record's date.
    #[must_use]
    pub fn day_index(&self, min_date: NaiveDate) -> i64 {
        self.date.signed_duration_since(min_date).num_days()
    }
}

impl PointRecord for VesselRecord {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }

    fn time_index(&self, min_date: NaiveDate) -> i64 {
        self.day_index(min_date)
    }

    fn kind(&self) -> RecordKind {
        RecordKind::VesselPresence
    }
}

/// Dataset-wide metadata loaded alongside the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    /// Reference date; day index 0.
    pub min_date: NaiveDate,
    /// Largest day index present in the sighting/trend data.
    pub max_time_index: i64,
}

impl DatasetMetadata {
    /// Largest week index, by integer division of the max day index.
    #[must_use]
    pub const fn max_week_index(&self) -> i64 {
        self.max_time_index.div_euclid(7)
    }

    /// Calendar date for a day offset, or `None` if out of chrono's range.
    #[must_use]
    pub fn date_for_day(&self, day: i64) -> Option<NaiveDate> {
        TimeDelta::try_days(day).and_then(|delta| self.min_date.checked_add_signed(delta))
    }
}

/// All records from a single data-source load.
///
/// Built once per load and never mutated afterwards; consumers only read.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordStore {
    metadata: DatasetMetadata,
    sightings: Vec<TurtleRecord>,
    trends: Vec<TurtleRecord>,
    vessels: Vec<VesselRecord>,
}

impl RecordStore {
    /// Builds a store, splitting turtle rows into sightings and trends while
    /// preserving their original order.
    #[must_use]
    pub fn new(
        metadata: DatasetMetadata,
        turtles: Vec<TurtleRecord>,
        vessels: Vec<VesselRecord>,
    ) -> Self {
        let (trends, sightings): (Vec<_>, Vec<_>) = turtles.into_iter().partition(|r| r.is_trend);

        Self {
            metadata,
            sightings,
            trends,
            vessels,
        }
    }

    #[must_use]
    pub const fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    #[must_use]
    pub const fn min_date(&self) -> NaiveDate {
        self.metadata.min_date
    }

    #[must_use]
    pub fn sightings(&self) -> &[TurtleRecord] {
        &self.sightings
    }

    #[must_use]
    pub fn trends(&self) -> &[TurtleRecord] {
        &self.trends
    }

    #[must_use]
    pub fn vessels(&self) -> &[VesselRecord] {
        &self.vessels
    }

    /// Number of records of the given kind.
    #[must_use]
    pub fn count(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Sighting => self.sightings.len(),
            RecordKind::Trend => self.trends.len(),
            RecordKind::VesselPresence => self.vessels.len(),
        }
    }
}
