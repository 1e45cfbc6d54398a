#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Time window model.
//!
//! Converts a time cursor into the half-open seven-day window of records
//! that are currently visible, and renders a human-readable label for it.
//! Two cursor flavours exist: a continuous day value with sub-day
//! precision (used for smooth playback) and a discrete week index.
//!
//! Nothing here clamps; callers keep cursors inside `[0, max_cursor]`.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use turtle_map_records_models::DatasetMetadata;

/// Length of every window, in days.
pub const WINDOW_LENGTH_DAYS: i64 = 7;

/// Label shown while the reference date is not yet known.
pub const LOADING_LABEL: &str = "Loading...";

const DATE_FORMAT: &str = "%b %-d, %Y";

/// A half-open day range `[start_day, end_day_exclusive)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start_day: i64,
    pub end_day_exclusive: i64,
}

impl TimeWindow {
    /// A full-length window beginning at `start_day`.
    ///
    /// Saturates at `i64::MAX`, so a window at the very end of the range is
    /// shorter than seven days.
    #[must_use]
    pub const fn starting_at(start_day: i64) -> Self {
        Self {
            start_day,
            end_day_exclusive: start_day.saturating_add(WINDOW_LENGTH_DAYS),
        }
    }

    /// Whether `day` falls inside the window.
    #[must_use]
    pub const fn contains(&self, day: i64) -> bool {
        self.start_day <= day && day < self.end_day_exclusive
    }

    /// Last day included in the window.
    #[must_use]
    pub const fn last_day(&self) -> i64 {
        self.end_day_exclusive - 1
    }
}

/// How the cursor position is interpreted.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CursorMode {
    /// Fractional day offset; the window slides one day at a time.
    #[default]
    Continuous,
    /// Whole week index; the window jumps seven days at a time.
    Week,
}

/// A position in time, in one of the two cursor modes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cursor {
    /// Day offset with sub-day precision.
    Continuous(f64),
    /// Week index; day offset is `index * 7`.
    Week(i64),
}

impl Cursor {
    /// Builds a cursor from a raw slider/playback position.
    ///
    /// In week mode the position is truncated to a whole week.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_position(mode: CursorMode, position: f64) -> Self {
        match mode {
            CursorMode::Continuous => Self::Continuous(position),
            CursorMode::Week => Self::Week(position.floor() as i64),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> CursorMode {
        match self {
            Self::Continuous(_) => CursorMode::Continuous,
            Self::Week(_) => CursorMode::Week,
        }
    }

    /// Window selected by this cursor.
    #[must_use]
    pub fn window(&self) -> TimeWindow {
        window_for(*self)
    }
}

/// Derives the visible window for a cursor.
///
/// Continuous cursors start at `floor(cursor)`; the fractional part never
/// changes the window. Week cursors start at `week * 7`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn window_for(cursor: Cursor) -> TimeWindow {
    match cursor {
        Cursor::Continuous(value) => TimeWindow::starting_at(value.floor() as i64),
        Cursor::Week(index) => {
            TimeWindow::starting_at(index.saturating_mul(WINDOW_LENGTH_DAYS))
        }
    }
}

/// Hour of day encoded in the fractional part of a continuous cursor,
/// truncated to a whole hour.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn hour_of_day(value: f64) -> u32 {
    let hours = ((value - value.floor()) * 24.0).floor();
    if hours.is_nan() {
        return 0;
    }
    hours.clamp(0.0, 23.0) as u32
}

/// 1-indexed position of `start_day` inside its calendar week of the
/// dataset (day 0 is day 1).
#[must_use]
pub const fn day_within_week(start_day: i64) -> i64 {
    start_day.rem_euclid(WINDOW_LENGTH_DAYS) + 1
}

/// Largest cursor value allowed for `mode`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn max_cursor(mode: CursorMode, metadata: &DatasetMetadata) -> f64 {
    match mode {
        CursorMode::Continuous => metadata.max_time_index as f64,
        CursorMode::Week => metadata.max_week_index() as f64,
    }
}

/// Renders the label for the window selected by `cursor`.
///
/// Returns [`LOADING_LABEL`] when no metadata has been loaded yet.
#[must_use]
pub fn format_window_label(cursor: Cursor, metadata: Option<&DatasetMetadata>) -> String {
    let Some(metadata) = metadata else {
        return LOADING_LABEL.to_string();
    };

    let window = window_for(cursor);
    let range = format_date_range(&window, metadata);

    match cursor {
        Cursor::Continuous(value) => format!(
            "{range} (Day {}, {:02}:00)",
            day_within_week(window.start_day),
            hour_of_day(value)
        ),
        Cursor::Week(_) => range,
    }
}

fn format_date_range(window: &TimeWindow, metadata: &DatasetMetadata) -> String {
    match (
        metadata.date_for_day(window.start_day),
        metadata.date_for_day(window.last_day()),
    ) {
        (Some(start), Some(end)) => format!(
            "{} - {}",
            start.format(DATE_FORMAT),
            end.format(DATE_FORMAT)
        ),
        _ => format!("Day {} - Day {}", window.start_day, window.last_day()),
    }
}
