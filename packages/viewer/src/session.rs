//! The viewer session.
//!
//! [`ViewerSession`] is the single owner of all mutable map state: the
//! loaded records, the cursor position, and the playback driver. The
//! window model, filter and proximity detector stay pure functions; the
//! session feeds them explicit inputs and stores only the derived
//! [`Frame`].
//!
//! Every mutation runs the same pipeline in a fixed order:
//! window -> filtered layers -> alert -> frame. If the window did not
//! change, only the label is refreshed and the previous layers and alert
//! are reused. Nothing is computed until a complete dataset is loaded.

use std::fmt;
use std::time::Duration;

use turtle_map_playback::{PlaybackDriver, PlaybackState};
use turtle_map_records_models::{RecordStore, TurtleRecord};
use turtle_map_source::{DataSource, LoadedDataset, SourceError, load_dataset};
use turtle_map_spatial::{FilteredLayers, ProximityIndex, detect_proximity, filter_store};
use turtle_map_timeline::{
    Cursor, CursorMode, LOADING_LABEL, format_window_label, max_cursor,
};

use crate::config::ViewerConfig;
use crate::frame::Frame;
use crate::summary::DatasetSummary;

/// Where the session is in its data lifecycle.
#[derive(Debug, Clone)]
pub enum LoadState {
    /// Waiting for the dataset.
    Loading,
    /// The load failed. Terminal for this session; nothing is rendered.
    Failed {
        /// Error message from the failed load.
        reason: String,
    },
    /// A complete dataset is available.
    Ready(Box<RecordStore>),
}

/// Counters for the work the pipeline has done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Window derivations (including label-only refreshes).
    pub windows_computed: u64,
    /// Full filter passes over the record store.
    pub filter_passes: u64,
    /// Proximity detector runs.
    pub proximity_checks: u64,
}

/// Owns the map state and recomputes the visible frame on every change.
#[derive(Debug)]
pub struct ViewerSession {
    config: ViewerConfig,
    load: LoadState,
    position: f64,
    playback: PlaybackDriver,
    frame: Option<Frame>,
    stats: SessionStats,
}

impl ViewerSession {
    /// Creates a session in the [`LoadState::Loading`] state.
    #[must_use]
    pub fn new(config: ViewerConfig) -> Self {
        let mut playback = PlaybackDriver::new(config.pacing, config.ticks_per_second);
        playback.set_speed(config.initial_speed);

        Self {
            config,
            load: LoadState::Loading,
            position: 0.0,
            playback,
            frame: None,
            stats: SessionStats::default(),
        }
    }

    /// Creates a session and loads `source` into it.
    ///
    /// A failed load leaves the session in [`LoadState::Failed`].
    pub async fn load(config: ViewerConfig, source: &dyn DataSource) -> Self {
        let mut session = Self::new(config);
        session.apply_load_result(load_dataset(source).await);
        session
    }

    /// Moves to `Ready` on success or `Failed` on error.
    pub fn apply_load_result(&mut self, result: Result<LoadedDataset, SourceError>) {
        match result {
            Ok(dataset) => self.finish_loading(dataset.store),
            Err(e) => self.fail_loading(&e),
        }
    }

    /// Installs a complete dataset and computes the first frame.
    pub fn finish_loading(&mut self, store: RecordStore) {
        log::info!(
            "Dataset ready: reference date {}, max day index {}",
            store.min_date(),
            store.metadata().max_time_index
        );
        self.load = LoadState::Ready(Box::new(store));
        self.frame = None;
        if let Some(max) = self.max_cursor() {
            self.position = self.position.clamp(0.0, max);
        }
        self.recompute();
    }

    /// Records a failed load. The session keeps showing the loading
    /// placeholder.
    pub fn fail_loading(&mut self, error: &dyn fmt::Display) {
        log::error!("Viewer data load failed: {error}");
        self.load = LoadState::Failed {
            reason: error.to_string(),
        };
        self.frame = None;
    }

    #[must_use]
    pub const fn load_state(&self) -> &LoadState {
        &self.load
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.load, LoadState::Ready(_))
    }

    #[must_use]
    pub fn store(&self) -> Option<&RecordStore> {
        match &self.load {
            LoadState::Ready(store) => Some(&**store),
            _ => None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ViewerConfig {
        &self.config
    }

    #[must_use]
    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Current frame, or `None` until a dataset is ready.
    #[must_use]
    pub const fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Current window label, or the loading placeholder.
    #[must_use]
    pub fn label(&self) -> &str {
        self.frame.as_ref().map_or(LOADING_LABEL, |f| f.label.as_str())
    }

    /// Whether the current window has a proximity alert.
    #[must_use]
    pub fn proximity_alert(&self) -> bool {
        self.frame.as_ref().is_some_and(|f| f.proximity_alert)
    }

    #[must_use]
    pub const fn cursor_mode(&self) -> CursorMode {
        self.config.cursor_mode
    }

    /// Raw cursor position (days, or weeks in week mode).
    #[must_use]
    pub const fn position(&self) -> f64 {
        self.position
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor::from_position(self.config.cursor_mode, self.position)
    }

    /// Upper cursor bound for the loaded dataset.
    #[must_use]
    pub fn max_cursor(&self) -> Option<f64> {
        self.store()
            .map(|store| max_cursor(self.config.cursor_mode, store.metadata()))
    }

    #[must_use]
    pub fn summary(&self) -> Option<DatasetSummary> {
        self.store()
            .map(|store| DatasetSummary::of(store, self.config.cursor_mode))
    }

    /// Sets the cursor, clamped to `[0, max_cursor]`.
    ///
    /// Before the dataset is ready only the lower bound is applied; the
    /// upper bound is enforced once loading completes.
    pub fn set_cursor(&mut self, value: f64) {
        if !value.is_finite() {
            log::warn!("Ignoring non-finite cursor {value}");
            return;
        }
        self.position = match self.max_cursor() {
            Some(max) => value.clamp(0.0, max),
            None => value.max(0.0),
        };
        self.recompute();
    }

    /// Moves forward one week, clamped to the last cursor position.
    pub fn next_week(&mut self) {
        self.step_week(1);
    }

    /// Moves back one week, clamped to zero.
    pub fn previous_week(&mut self) {
        self.step_week(-1);
    }

    fn step_week(&mut self, direction: i8) {
        let target = match self.config.cursor_mode {
            CursorMode::Week => self.position.floor() + f64::from(direction),
            CursorMode::Continuous => {
                #[allow(clippy::cast_precision_loss)]
                let days = turtle_map_timeline::WINDOW_LENGTH_DAYS as f64;
                self.position + f64::from(direction) * days
            }
        };
        self.set_cursor(target);
    }

    pub fn play(&mut self) {
        self.playback.play();
    }

    pub fn pause(&mut self) {
        self.playback.pause();
    }

    pub fn toggle_playback(&mut self) -> PlaybackState {
        self.playback.toggle()
    }

    #[must_use]
    pub const fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    /// Sets playback speed; returns the clamped speed in effect.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.playback.set_speed(speed)
    }

    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.playback.speed()
    }

    /// Handles one frame tick from the host clock.
    ///
    /// Advances the cursor only while playing and only once the dataset is
    /// ready. Returns `true` if the cursor moved.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if !self.playback.is_playing() {
            return false;
        }
        let Some(max) = self.max_cursor() else {
            return false;
        };

        let next = self.playback.tick(self.position, max, elapsed);
        #[allow(clippy::float_cmp)]
        let moved = next != self.position;
        self.position = next;
        if moved {
            self.recompute();
        }
        moved
    }

    fn recompute(&mut self) {
        let cursor = self.cursor();
        let LoadState::Ready(store) = &self.load else {
            return;
        };

        let window = cursor.window();
        let label = format_window_label(cursor, Some(store.metadata()));
        self.stats.windows_computed += 1;

        if let Some(frame) = self.frame.as_mut()
            && frame.window == window
        {
            frame.cursor = cursor;
            frame.label = label;
            return;
        }

        let layers = filter_store(store, &window);
        self.stats.filter_passes += 1;

        let proximity_alert = alert_for(&self.config, &layers);
        self.stats.proximity_checks += 1;

        let was_alerting = self.frame.as_ref().is_some_and(|f| f.proximity_alert);
        if proximity_alert != was_alerting {
            if proximity_alert {
                log::info!("Proximity alert raised: {label}");
            } else {
                log::info!("Proximity alert cleared: {label}");
            }
        }

        self.frame = Some(Frame {
            cursor,
            window,
            label,
            layers,
            proximity_alert,
            min_date: store.min_date(),
        });
    }
}

fn alert_for(config: &ViewerConfig, layers: &FilteredLayers) -> bool {
    let threshold = config.proximity_threshold_degrees;

    let with_trends: Vec<TurtleRecord>;
    let turtles: &[TurtleRecord] = if config.include_trends_in_alert {
        with_trends = [layers.sightings.as_slice(), layers.trends.as_slice()].concat();
        &with_trends
    } else {
        &layers.sightings
    };

    let vessels = &layers.vessels;
    if config.spatial_index_min_vessels > 0 && vessels.len() >= config.spatial_index_min_vessels {
        ProximityIndex::build(vessels).any_within(turtles, threshold)
    } else {
        detect_proximity(turtles, vessels, threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use turtle_map_playback::Pacing;
    use turtle_map_records_models::{DatasetMetadata, VesselRecord};

    fn min_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
    }

    fn vessel(lon: f64, lat: f64, day: u32) -> VesselRecord {
        VesselRecord {
            latitude: lat,
            longitude: lon,
            date: NaiveDate::from_ymd_opt(2023, 6, day).unwrap(),
            presence_hours: 2.0,
        }
    }

    /// Turtle near a vessel in days 7..14 only; trend point near a vessel
    /// in days 14..21.
    fn store() -> RecordStore {
        RecordStore::new(
            DatasetMetadata {
                min_date: min_date(),
                max_time_index: 27,
            },
            vec![
                TurtleRecord::sighting(45.0, -62.0, 2),
                TurtleRecord::sighting(45.0, -62.0, 9),
                TurtleRecord::trend(40.0, -70.0, 15),
            ],
            vec![
                vessel(-60.0, 45.0, 3),
                vessel(-61.8, 45.0, 10),
                vessel(-70.1, 40.0, 16),
            ],
        )
    }

    fn ready(config: ViewerConfig) -> ViewerSession {
        let mut session = ViewerSession::new(config);
        session.finish_loading(store());
        session
    }

    #[test]
    fn nothing_is_computed_before_load_completes() {
        let mut session = ViewerSession::new(ViewerConfig::default());
        session.set_cursor(5.0);
        session.next_week();
        session.play();
        assert!(!session.tick(Duration::from_millis(16)));

        assert!(session.frame().is_none());
        assert_eq!(session.label(), LOADING_LABEL);
        assert!(!session.proximity_alert());
        assert_eq!(session.stats(), SessionStats::default());
    }

    #[test]
    fn failed_load_stays_in_loading_presentation() {
        let mut session = ViewerSession::new(ViewerConfig::default());
        session.fail_loading(&"connection refused");

        assert!(matches!(session.load_state(), LoadState::Failed { .. }));
        assert!(session.frame().is_none());
        assert_eq!(session.label(), LOADING_LABEL);
        session.set_cursor(3.0);
        assert_eq!(session.stats(), SessionStats::default());
    }

    #[test]
    fn first_frame_computed_on_load() {
        let session = ready(ViewerConfig::default());
        let frame = session.frame().unwrap();

        assert_eq!(frame.window.start_day, 0);
        assert_eq!(frame.layers.sightings.len(), 1);
        assert_eq!(frame.layers.vessels.len(), 1);
        assert!(!frame.proximity_alert);
        assert_eq!(session.stats().filter_passes, 1);
    }

    #[test]
    fn moving_into_alert_window_raises_alert() {
        let mut session = ready(ViewerConfig::default());
        session.set_cursor(7.0);

        assert!(session.proximity_alert());
        assert_eq!(session.frame().unwrap().layers.sightings[0].time_index, 9);

        session.set_cursor(0.0);
        assert!(!session.proximity_alert());
    }

    #[test]
    fn same_window_only_refreshes_label() {
        let mut session = ready(ViewerConfig::default());
        session.set_cursor(7.25);
        let passes = session.stats().filter_passes;
        let label_before = session.label().to_owned();

        session.set_cursor(7.5);
        assert_eq!(session.stats().filter_passes, passes);
        assert_ne!(session.label(), label_before);
        assert!(session.label().ends_with("12:00)"));
    }

    #[test]
    fn cursor_is_clamped_to_dataset_bounds() {
        let mut session = ready(ViewerConfig::default());
        session.set_cursor(500.0);
        assert!((session.position() - 27.0).abs() < f64::EPSILON);
        session.set_cursor(-3.0);
        assert!(session.position().abs() < f64::EPSILON);
    }

    #[test]
    fn huge_time_index_does_not_overflow_window() {
        let mut session = ViewerSession::new(ViewerConfig::default());
        session.finish_loading(RecordStore::new(
            DatasetMetadata {
                min_date: min_date(),
                max_time_index: i64::MAX,
            },
            vec![TurtleRecord::sighting(45.0, -62.0, 2)],
            Vec::new(),
        ));

        session.set_cursor(1e30);
        let frame = session.frame().unwrap();
        assert_eq!(frame.window.start_day, i64::MAX);
        assert!(frame.layers.sightings.is_empty());
        assert!(!frame.proximity_alert);
    }

    #[test]
    fn week_navigation_in_week_mode() {
        let mut session = ready(ViewerConfig {
            cursor_mode: CursorMode::Week,
            ..ViewerConfig::default()
        });

        assert_eq!(session.max_cursor(), Some(3.0));
        session.next_week();
        assert_eq!(session.cursor(), Cursor::Week(1));
        assert!(session.proximity_alert());

        for _ in 0..10 {
            session.next_week();
        }
        assert_eq!(session.cursor(), Cursor::Week(3));

        for _ in 0..10 {
            session.previous_week();
        }
        assert_eq!(session.cursor(), Cursor::Week(0));
    }

    #[test]
    fn week_navigation_in_continuous_mode_moves_seven_days() {
        let mut session = ready(ViewerConfig::default());
        session.set_cursor(2.5);
        session.next_week();
        assert!((session.position() - 9.5).abs() < f64::EPSILON);
        session.previous_week();
        session.previous_week();
        assert!(session.position().abs() < f64::EPSILON);
    }

    #[test]
    fn trends_count_for_alert_only_when_enabled() {
        let mut without = ready(ViewerConfig::default());
        without.set_cursor(14.0);
        assert!(!without.proximity_alert());

        let mut with = ready(ViewerConfig {
            include_trends_in_alert: true,
            ..ViewerConfig::default()
        });
        with.set_cursor(14.0);
        assert!(with.proximity_alert());
    }

    #[test]
    fn spatial_index_path_matches_scan() {
        let mut indexed = ready(ViewerConfig {
            spatial_index_min_vessels: 1,
            ..ViewerConfig::default()
        });
        let mut scanned = ready(ViewerConfig {
            spatial_index_min_vessels: 0,
            ..ViewerConfig::default()
        });

        for cursor in [0.0, 7.0, 14.0, 20.0] {
            indexed.set_cursor(cursor);
            scanned.set_cursor(cursor);
            assert_eq!(indexed.proximity_alert(), scanned.proximity_alert());
        }
    }

    #[test]
    fn playback_wraps_at_end_of_data() {
        let mut session = ready(ViewerConfig::default());
        session.set_speed(5.0);
        session.set_cursor(27.0 - 0.001);
        session.play();

        assert!(session.tick(Duration::from_millis(16)));
        assert!(session.position().abs() < f64::EPSILON);
        assert_eq!(session.frame().unwrap().window.start_day, 0);
    }

    #[test]
    fn paused_session_ignores_ticks() {
        let mut session = ready(ViewerConfig::default());
        session.set_cursor(3.0);
        assert!(!session.tick(Duration::from_millis(16)));
        assert!((session.position() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn elapsed_pacing_follows_frame_time() {
        let mut session = ready(ViewerConfig {
            pacing: Pacing::Elapsed,
            ..ViewerConfig::default()
        });
        session.set_speed(2.0);
        session.play();
        session.tick(Duration::from_secs(1));
        assert!((session.position() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn playback_crossing_window_boundary_refilters() {
        let mut session = ready(ViewerConfig::default());
        session.set_speed(5.0);
        session.set_cursor(6.95);
        session.play();
        let passes = session.stats().filter_passes;

        session.tick(Duration::from_millis(16));
        assert_eq!(session.frame().unwrap().window.start_day, 7);
        assert_eq!(session.stats().filter_passes, passes + 1);
    }

    #[test]
    fn summary_reflects_store() {
        let session = ready(ViewerConfig::default());
        let summary = session.summary().unwrap();
        assert_eq!(summary.sightings, 2);
        assert_eq!(summary.trends, 1);
        assert_eq!(summary.vessels, 3);
        assert!(ViewerSession::new(ViewerConfig::default()).summary().is_none());
    }
}
