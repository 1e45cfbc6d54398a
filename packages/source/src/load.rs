//! All-or-nothing dataset loading.
//!
//! The three resources are fetched concurrently and parsed only once all
//! of them have arrived. Any failure aborts the whole load: callers either
//! get a complete [`RecordStore`] or an error, never a partial dataset.

use turtle_map_records_models::RecordStore;

use crate::csv_rows::{parse_turtle_csv, parse_vessel_csv};
use crate::metadata::parse_metadata;
use crate::{DataSource, SourceError};

/// Accepted/dropped row counts for one CSV resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowReport {
    pub accepted: u64,
    pub dropped: u64,
}

/// Row counts for a completed load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub sightings: RowReport,
    pub vessels: RowReport,
}

/// A fully loaded dataset.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub store: RecordStore,
    pub report: LoadReport,
}

/// Fetches and parses a complete dataset from `source`.
///
/// No retry is attempted; the error is logged and returned.
///
/// # Errors
///
/// Returns [`SourceError`] if any fetch fails or any resource cannot be
/// parsed.
pub async fn load_dataset(source: &dyn DataSource) -> Result<LoadedDataset, SourceError> {
    log::info!("Loading dataset ({})", source.describe());

    let result = fetch_and_parse(source).await;

    match &result {
        Ok(dataset) => log::info!(
            "Loaded {} sightings, {} trends, {} vessel records (dropped {} sighting rows, {} vessel rows)",
            dataset.store.sightings().len(),
            dataset.store.trends().len(),
            dataset.store.vessels().len(),
            dataset.report.sightings.dropped,
            dataset.report.vessels.dropped,
        ),
        Err(e) => log::error!("Dataset load failed: {e}"),
    }

    result
}

async fn fetch_and_parse(source: &dyn DataSource) -> Result<LoadedDataset, SourceError> {
    let (metadata_text, sightings_text, vessels_text) = tokio::try_join!(
        source.fetch_metadata(),
        source.fetch_sightings(),
        source.fetch_vessels(),
    )?;

    let metadata = parse_metadata(&metadata_text)?;
    let (turtles, sightings_report) = parse_turtle_csv(&sightings_text)?;
    let (vessels, vessels_report) = parse_vessel_csv(&vessels_text)?;

    Ok(LoadedDataset {
        store: RecordStore::new(metadata, turtles, vessels),
        report: LoadReport {
            sightings: sightings_report,
            vessels: vessels_report,
        },
    })
}
