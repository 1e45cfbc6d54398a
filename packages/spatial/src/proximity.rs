//! Turtle/vessel proximity detection.
//!
//! Distances are planar, measured in raw degrees of longitude and latitude.
//! This is not a geodesic distance: at temperate latitudes a degree of
//! longitude is noticeably shorter than a degree of latitude. The alert is
//! advisory only, and the threshold is expressed in the same degree units.

use geo::Point;
use rstar::RTree;
use turtle_map_records_models::PointRecord;

/// Alert threshold used when none is configured, in degrees.
pub const DEFAULT_THRESHOLD_DEGREES: f64 = 0.5;

fn position<R: PointRecord>(record: &R) -> Point<f64> {
    Point::new(record.longitude(), record.latitude())
}

fn squared_degree_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    let delta = a - b;
    delta.x().mul_add(delta.x(), delta.y() * delta.y())
}

/// Returns `true` if any vessel lies strictly closer than
/// `threshold_degrees` to any turtle.
///
/// Scans every vessel/turtle pair and stops at the first match. Either
/// slice being empty yields `false` without comparing anything. Records
/// with `NaN` coordinates never match.
#[must_use]
pub fn detect_proximity<T, V>(turtles: &[T], vessels: &[V], threshold_degrees: f64) -> bool
where
    T: PointRecord,
    V: PointRecord,
{
    if turtles.is_empty() || vessels.is_empty() {
        return false;
    }

    let max_squared = threshold_degrees * threshold_degrees;

    for vessel in vessels {
        let vessel_position = position(vessel);
        for turtle in turtles {
            if squared_degree_distance(vessel_position, position(turtle)) < max_squared {
                log::trace!(
                    "Proximity hit: vessel ({}, {}) near turtle ({}, {})",
                    vessel.longitude(),
                    vessel.latitude(),
                    turtle.longitude(),
                    turtle.latitude()
                );
                return true;
            }
        }
    }

    false
}

/// R-tree over vessel positions for windows with many vessel records.
///
/// Answers the same question as [`detect_proximity`] with the same strict
/// threshold, but probes the tree once per turtle instead of scanning every
/// pair.
pub struct ProximityIndex {
    vessels: RTree<[f64; 2]>,
}

impl ProximityIndex {
    /// Builds the index. Vessels with non-finite coordinates are left out
    /// since they can never be within any threshold.
    #[must_use]
    pub fn build<V: PointRecord>(vessels: &[V]) -> Self {
        let points: Vec<[f64; 2]> = vessels
            .iter()
            .map(|v| [v.longitude(), v.latitude()])
            .filter(|[x, y]| x.is_finite() && y.is_finite())
            .collect();

        Self {
            vessels: RTree::bulk_load(points),
        }
    }

    /// Number of indexed vessel positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vessels.size()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vessels.size() == 0
    }

    /// Returns `true` if any turtle lies strictly closer than
    /// `threshold_degrees` to an indexed vessel.
    #[must_use]
    pub fn any_within<T: PointRecord>(&self, turtles: &[T], threshold_degrees: f64) -> bool {
        if turtles.is_empty() || self.is_empty() {
            return false;
        }

        let max_squared = threshold_degrees * threshold_degrees;

        turtles.iter().any(|turtle| {
            let query = position(turtle);
            if !query.x().is_finite() || !query.y().is_finite() {
                return false;
            }

            // rstar's radius is inclusive; re-check strictly.
            self.vessels
                .locate_within_distance([query.x(), query.y()], max_squared)
                .any(|&[x, y]| squared_degree_distance(Point::new(x, y), query) < max_squared)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use turtle_map_records_models::{TurtleRecord, VesselRecord};

    fn turtle(lon: f64, lat: f64) -> TurtleRecord {
        TurtleRecord::sighting(lat, lon, 0)
    }

    fn vessel(lon: f64, lat: f64) -> VesselRecord {
        VesselRecord {
            latitude: lat,
            longitude: lon,
            date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            presence_hours: 1.0,
        }
    }

    #[test]
    fn nearby_vessel_raises_alert() {
        let turtles = vec![turtle(-62.0, 45.0)];
        let vessels = vec![vessel(-61.8, 45.0)];
        assert!(detect_proximity(&turtles, &vessels, 0.5));
    }

    #[test]
    fn distant_vessel_does_not_alert() {
        let turtles = vec![turtle(-62.0, 45.0)];
        let vessels = vec![vessel(-60.0, 45.0)];
        assert!(!detect_proximity(&turtles, &vessels, 0.5));
    }

    #[test]
    fn empty_inputs_never_alert() {
        let turtles = vec![turtle(-62.0, 45.0)];
        let vessels = vec![vessel(-62.0, 45.0)];
        let no_turtles: Vec<TurtleRecord> = Vec::new();
        let no_vessels: Vec<VesselRecord> = Vec::new();

        assert!(!detect_proximity(&no_turtles, &vessels, 0.5));
        assert!(!detect_proximity(&turtles, &no_vessels, 0.5));
        assert!(!detect_proximity(&no_turtles, &no_vessels, 0.5));
    }

    #[test]
    fn threshold_is_strict() {
        let turtles = vec![turtle(0.0, 0.0)];
        let vessels = vec![vessel(0.5, 0.0)];
        assert!(!detect_proximity(&turtles, &vessels, 0.5));
        assert!(!ProximityIndex::build(&vessels).any_within(&turtles, 0.5));
    }

    #[test]
    fn distance_is_planar_in_degrees() {
        // 0.3 in each axis -> sqrt(0.18) ~= 0.424 degrees.
        let turtles = vec![turtle(-62.0, 45.0)];
        let vessels = vec![vessel(-61.7, 45.3)];
        assert!(detect_proximity(&turtles, &vessels, 0.5));
        assert!(!detect_proximity(&turtles, &vessels, 0.4));
    }

    #[test]
    fn nan_coordinates_never_match() {
        let turtles = vec![turtle(f64::NAN, 45.0)];
        let vessels = vec![vessel(-62.0, 45.0)];
        assert!(!detect_proximity(&turtles, &vessels, 0.5));
        assert!(!ProximityIndex::build(&vessels).any_within(&turtles, 0.5));
    }

    #[test]
    fn index_agrees_with_pairwise_scan() {
        let turtles: Vec<TurtleRecord> = (0..20)
            .map(|i| turtle(-65.0 + f64::from(i) * 0.37, 44.0 + f64::from(i % 5) * 0.21))
            .collect();
        let far_vessels: Vec<VesselRecord> = (0..30)
            .map(|i| vessel(-50.0 + f64::from(i) * 0.1, 30.0))
            .collect();
        let mut near_vessels = far_vessels.clone();
        near_vessels.push(vessel(-63.1, 44.6));

        for (vessels, threshold) in [
            (&far_vessels, 0.5),
            (&near_vessels, 0.5),
            (&near_vessels, 0.05),
            (&near_vessels, 2.0),
        ] {
            let index = ProximityIndex::build(vessels);
            assert_eq!(
                index.any_within(&turtles, threshold),
                detect_proximity(&turtles, vessels, threshold),
                "disagreement at threshold {threshold}"
            );
        }
    }
}
