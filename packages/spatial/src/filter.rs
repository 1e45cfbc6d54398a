//! Time-window filtering for every record layer.

use chrono::NaiveDate;
use turtle_map_records_models::{PointRecord, RecordKind, RecordStore, TurtleRecord, VesselRecord};
use turtle_map_timeline::TimeWindow;

/// Keeps the records whose day index lies in `window`, in their original
/// order.
///
/// Dated records are converted to a day index relative to `min_date`
/// first. Linear scan; datasets are small enough that no index is kept.
#[must_use]
pub fn filter_in_window<T>(records: &[T], window: &TimeWindow, min_date: NaiveDate) -> Vec<T>
where
    T: PointRecord + Clone,
{
    records
        .iter()
        .filter(|record| window.contains(record.time_index(min_date)))
        .cloned()
        .collect()
}

/// The three record layers restricted to one time window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilteredLayers {
    pub sightings: Vec<TurtleRecord>,
    pub trends: Vec<TurtleRecord>,
    pub vessels: Vec<VesselRecord>,
}

impl FilteredLayers {
    /// Number of visible records of the given kind.
    #[must_use]
    pub fn count(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Sighting => self.sightings.len(),
            RecordKind::Trend => self.trends.len(),
            RecordKind::VesselPresence => self.vessels.len(),
        }
    }

    /// Total number of visible records across all layers.
    #[must_use]
    pub fn total(&self) -> usize {
        self.sightings.len() + self.trends.len() + self.vessels.len()
    }
}

/// Filters all three layers of `store` with the same window so that they
/// stay time-synchronized.
#[must_use]
pub fn filter_store(store: &RecordStore, window: &TimeWindow) -> FilteredLayers {
    let min_date = store.min_date();

    let layers = FilteredLayers {
        sightings: filter_in_window(store.sightings(), window, min_date),
        trends: filter_in_window(store.trends(), window, min_date),
        vessels: filter_in_window(store.vessels(), window, min_date),
    };

    log::debug!(
        "Window [{}, {}): {} sightings, {} trends, {} vessel records",
        window.start_day,
        window.end_day_exclusive,
        layers.sightings.len(),
        layers.trends.len(),
        layers.vessels.len()
    );

    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use turtle_map_records_models::DatasetMetadata;

    fn min_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
    }

    fn turtles(indices: &[i64]) -> Vec<TurtleRecord> {
        indices
            .iter()
            .map(|&i| TurtleRecord::sighting(45.0, -62.0, i))
            .collect()
    }

    fn vessel_on(day: u32) -> VesselRecord {
        VesselRecord {
            latitude: 45.0,
            longitude: -61.8,
            date: NaiveDate::from_ymd_opt(2023, 6, day).unwrap(),
            presence_hours: 2.0,
        }
    }

    #[test]
    fn keeps_only_records_inside_half_open_window() {
        let records = turtles(&[-1, 0, 6, 7, 13]);
        let kept = filter_in_window(&records, &TimeWindow::starting_at(0), min_date());

        let indices: Vec<i64> = kept.iter().map(|r| r.time_index).collect();
        assert_eq!(indices, vec![0, 6]);
    }

    #[test]
    fn filtering_twice_matches_filtering_once() {
        let records = turtles(&[-1, 0, 3, 6, 7, 13, 2]);
        let window = TimeWindow::starting_at(0);

        let once = filter_in_window(&records, &window, min_date());
        let twice = filter_in_window(&once, &window, min_date());
        assert_eq!(once, twice);
    }

    #[test]
    fn preserves_input_order() {
        let records = turtles(&[5, 1, 3]);
        let kept = filter_in_window(&records, &TimeWindow::starting_at(0), min_date());
        let indices: Vec<i64> = kept.iter().map(|r| r.time_index).collect();
        assert_eq!(indices, vec![5, 1, 3]);
    }

    #[test]
    fn vessel_dates_are_converted_before_filtering() {
        // June 10 is nine days after the June 1 reference date.
        let vessels = vec![vessel_on(10)];

        let second_week = filter_in_window(&vessels, &TimeWindow::starting_at(7), min_date());
        assert_eq!(second_week.len(), 1);

        let first_week = filter_in_window(&vessels, &TimeWindow::starting_at(0), min_date());
        assert!(first_week.is_empty());
    }

    #[test]
    fn store_layers_share_one_window() {
        let store = RecordStore::new(
            DatasetMetadata {
                min_date: min_date(),
                max_time_index: 30,
            },
            vec![
                TurtleRecord::sighting(45.0, -62.0, 8),
                TurtleRecord::trend(45.0, -62.0, 9),
                TurtleRecord::sighting(45.0, -62.0, 2),
            ],
            vec![vessel_on(10), vessel_on(2)],
        );

        let layers = filter_store(&store, &TimeWindow::starting_at(7));
        assert_eq!(layers.count(RecordKind::Sighting), 1);
        assert_eq!(layers.count(RecordKind::Trend), 1);
        assert_eq!(layers.count(RecordKind::VesselPresence), 1);
        assert_eq!(layers.total(), 3);

        // Source store is untouched.
        assert_eq!(store.sightings().len(), 2);
        assert_eq!(store.vessels().len(), 2);
    }
}
