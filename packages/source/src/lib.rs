#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Data source trait and parsing for the three turtle-map inputs.
//!
//! A dataset is made of a metadata JSON document, a sightings/trends CSV,
//! and a vessel presence CSV. Each [`DataSource`] implementation knows how
//! to fetch the raw text for those three resources; the parsing and the
//! all-or-nothing load live in this crate so that every source behaves the
//! same way.

pub mod csv_rows;
pub mod load;
pub mod location;
pub mod metadata;
pub mod parsing;

use std::path::PathBuf;

use async_trait::async_trait;

pub use load::{LoadReport, LoadedDataset, RowReport, load_dataset};
pub use location::{Location, LocationSource};

/// Errors that can occur while fetching or parsing a dataset.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading a local file failed.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The CSV content could not be read at all.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// The metadata document is not valid JSON of the expected shape.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The metadata document parsed but holds unusable values.
    #[error("Invalid metadata: {message}")]
    Metadata {
        /// Description of what went wrong.
        message: String,
    },
}

/// Trait that every dataset provider implements.
///
/// Each method returns the raw text of one resource. Fetches are issued
/// concurrently by [`load_dataset`] and are never retried.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human-readable description for log messages.
    fn describe(&self) -> String;

    /// Fetches the metadata JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the resource cannot be retrieved.
    async fn fetch_metadata(&self) -> Result<String, SourceError>;

    /// Fetches the sightings/trends CSV.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the resource cannot be retrieved.
    async fn fetch_sightings(&self) -> Result<String, SourceError>;

    /// Fetches the vessel presence CSV.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the resource cannot be retrieved.
    async fn fetch_vessels(&self) -> Result<String, SourceError>;
}
