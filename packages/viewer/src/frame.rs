//! Render description for one time window.
//!
//! A [`Frame`] is everything a map front end needs to draw the current
//! moment: the window label, the three time-synchronized layers, and the
//! proximity alert flag. It can be exported as a `GeoJSON`
//! `FeatureCollection` for any renderer that speaks `GeoJSON`.

use chrono::NaiveDate;
use geojson::{Feature, FeatureCollection, Geometry};
use serde_json::{Map, Value};
use turtle_map_records_models::{PointRecord, RecordKind, VesselRecord};
use turtle_map_spatial::FilteredLayers;
use turtle_map_timeline::{Cursor, TimeWindow};

/// The visible state of the map for one cursor position.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Cursor this frame was labelled for.
    pub cursor: Cursor,
    /// Active window.
    pub window: TimeWindow,
    /// Human-readable window label.
    pub label: String,
    /// Records inside the window.
    pub layers: FilteredLayers,
    /// Whether any turtle is within the threshold of any vessel.
    pub proximity_alert: bool,
    /// Reference date the window is relative to.
    pub min_date: NaiveDate,
}

impl Frame {
    /// Builds a `GeoJSON` `FeatureCollection` with one point feature per
    /// visible record.
    ///
    /// Each feature carries `layer` and `timeIndex` properties; vessel
    /// features also carry `presenceHours`. The window, label and alert are
    /// attached as foreign members. Records with non-finite coordinates
    /// are left out since `GeoJSON` cannot represent them.
    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let mut features = Vec::with_capacity(self.layers.total());
        let mut skipped = 0usize;

        let turtles = self.layers.sightings.iter().chain(&self.layers.trends);
        for record in turtles {
            match point_feature(record, self.min_date, Map::new()) {
                Some(feature) => features.push(feature),
                None => skipped += 1,
            }
        }

        for vessel in &self.layers.vessels {
            match point_feature(vessel, self.min_date, vessel_properties(vessel)) {
                Some(feature) => features.push(feature),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            log::debug!("Skipped {skipped} records with non-finite coordinates in GeoJSON export");
        }

        let mut foreign = Map::new();
        foreign.insert("label".to_owned(), Value::from(self.label.clone()));
        foreign.insert("startDay".to_owned(), Value::from(self.window.start_day));
        foreign.insert(
            "endDayExclusive".to_owned(),
            Value::from(self.window.end_day_exclusive),
        );
        foreign.insert("proximityAlert".to_owned(), Value::from(self.proximity_alert));

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign),
        }
    }

    /// The feature collection serialized as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_geojson_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_feature_collection())
    }
}

fn vessel_properties(vessel: &VesselRecord) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "presenceHours".to_owned(),
        Value::from(vessel.presence_hours),
    );
    properties
}

fn point_feature<R: PointRecord>(
    record: &R,
    min_date: NaiveDate,
    mut properties: Map<String, Value>,
) -> Option<Feature> {
    let (lon, lat) = (record.longitude(), record.latitude());
    if !lon.is_finite() || !lat.is_finite() {
        return None;
    }

    let kind: RecordKind = record.kind();
    properties.insert("layer".to_owned(), Value::from(kind.as_ref()));
    properties.insert(
        "timeIndex".to_owned(),
        Value::from(record.time_index(min_date)),
    );

    let point = geo::Point::new(lon, lat);

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&point))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}
