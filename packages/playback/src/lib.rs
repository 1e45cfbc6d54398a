#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Playback driver.
//!
//! A two-state machine (`Stopped`, `Playing`) that moves the time cursor
//! forward on each frame tick from the host's frame clock. The driver
//! holds no cursor of its own: it is handed the current value and returns
//! the next one.
//!
//! With [`Pacing::FixedRate`] every tick advances by `speed / ticks_per_second`
//! days no matter how much wall-clock time actually passed, so playback
//! only runs at the nominal speed when the host really ticks at the
//! assumed rate. [`Pacing::Elapsed`] uses the measured frame time instead.
//! Missed ticks are never caught up in either mode.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Slowest playback speed, in days per second.
pub const MIN_SPEED: f64 = 0.1;
/// Fastest playback speed, in days per second.
pub const MAX_SPEED: f64 = 5.0;
/// Granularity of the speed control.
pub const SPEED_STEP: f64 = 0.1;
/// Speed used until the user picks one.
pub const DEFAULT_SPEED: f64 = 1.0;
/// Frame rate assumed by fixed-rate pacing.
pub const DEFAULT_TICKS_PER_SECOND: f64 = 60.0;
/// Slowest accepted frame rate; one tick per second.
pub const MIN_TICKS_PER_SECOND: f64 = 1.0;

/// Whether the cursor is currently advancing.
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
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

/// How far a single tick moves the cursor.
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
pub enum Pacing {
    /// `speed / ticks_per_second` per tick, ignoring real frame time.
    #[default]
    FixedRate,
    /// `speed * elapsed_seconds` per tick.
    Elapsed,
}

/// Clamps a requested speed to `[MIN_SPEED, MAX_SPEED]` and snaps it to
/// the nearest [`SPEED_STEP`].
///
/// Returns `None` for non-finite input.
#[must_use]
pub fn normalize_speed(speed: f64) -> Option<f64> {
    if !speed.is_finite() {
        return None;
    }
    let stepped = (speed / SPEED_STEP).round() * SPEED_STEP;
    Some(stepped.clamp(MIN_SPEED, MAX_SPEED))
}

/// Advances a time cursor while playing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackDriver {
    state: PlaybackState,
    speed: f64,
    ticks_per_second: f64,
    pacing: Pacing,
}

impl Default for PlaybackDriver {
    fn default() -> Self {
        Self::new(Pacing::default(), DEFAULT_TICKS_PER_SECOND)
    }
}

impl PlaybackDriver {
    /// Creates a stopped driver at [`DEFAULT_SPEED`].
    ///
    /// A `ticks_per_second` below [`MIN_TICKS_PER_SECOND`] or non-finite
    /// falls back to [`DEFAULT_TICKS_PER_SECOND`].
    #[must_use]
    pub fn new(pacing: Pacing, ticks_per_second: f64) -> Self {
        let valid = ticks_per_second.is_finite() && ticks_per_second >= MIN_TICKS_PER_SECOND;
        let ticks_per_second = if valid {
            ticks_per_second
        } else {
            log::warn!(
                "Invalid ticks_per_second {ticks_per_second}, using {DEFAULT_TICKS_PER_SECOND}"
            );
            DEFAULT_TICKS_PER_SECOND
        };

        Self {
            state: PlaybackState::Stopped,
            speed: DEFAULT_SPEED,
            ticks_per_second,
            pacing,
        }
    }

    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing)
    }

    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    #[must_use]
    pub const fn pacing(&self) -> Pacing {
        self.pacing
    }

    #[must_use]
    pub const fn ticks_per_second(&self) -> f64 {
        self.ticks_per_second
    }

    /// `Stopped` -> `Playing`. No-op if already playing.
    pub fn play(&mut self) {
        if !self.is_playing() {
            log::debug!("Playback started at speed {}", self.speed);
            self.state = PlaybackState::Playing;
        }
    }

    /// `Playing` -> `Stopped`. No-op if already stopped.
    pub fn pause(&mut self) {
        if self.is_playing() {
            log::debug!("Playback paused");
            self.state = PlaybackState::Stopped;
        }
    }

    /// Flips between playing and stopped, returning the new state.
    pub fn toggle(&mut self) -> PlaybackState {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
        self.state
    }

    /// Sets the speed, clamped and snapped by [`normalize_speed`].
    ///
    /// Non-finite input leaves the speed unchanged. Returns the speed now
    /// in effect.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        match normalize_speed(speed) {
            Some(speed) => self.speed = speed,
            None => log::warn!("Ignoring non-finite playback speed {speed}"),
        }
        self.speed
    }

    /// Cursor distance covered by one tick.
    #[must_use]
    pub fn step(&self, elapsed: Duration) -> f64 {
        match self.pacing {
            Pacing::FixedRate => self.speed / self.ticks_per_second,
            Pacing::Elapsed => self.speed * elapsed.as_secs_f64(),
        }
    }

    /// Returns the cursor after one tick.
    ///
    /// While stopped the cursor is returned unchanged. Passing
    /// `max_cursor` resets to exactly `0.0`; the overshoot is discarded.
    #[must_use]
    pub fn tick(&self, cursor: f64, max_cursor: f64, elapsed: Duration) -> f64 {
        if !self.is_playing() {
            return cursor;
        }

        let next = cursor + self.step(elapsed);
        if next > max_cursor {
            log::debug!("Playback wrapped at {next} (max {max_cursor})");
            0.0
        } else {
            log::trace!("Playback tick {cursor} -> {next}");
            next
        }
    }
}
