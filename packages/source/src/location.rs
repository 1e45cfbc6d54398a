//! File-or-URL data source.
//!
//! [`LocationSource`] resolves each of the three dataset resources to
//! either a local path or an `http(s)` URL, so a dataset can be mixed
//! (e.g. local metadata with remote CSVs).

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{DataSource, SourceError};

/// Default metadata filename inside a dataset directory.
pub const METADATA_FILENAME: &str = "metadata.json";
/// Default sightings filename inside a dataset directory.
pub const SIGHTINGS_FILENAME: &str = "sightings.csv";
/// Default vessel presence filename inside a dataset directory.
pub const VESSELS_FILENAME: &str = "vessels.csv";

/// Where one resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A local file.
    File(PathBuf),
    /// An `http://` or `https://` URL.
    Url(String),
}

impl Location {
    /// Classifies a user-supplied string as a URL or a file path.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_owned())
        } else {
            Self::File(PathBuf::from(s))
        }
    }

    /// Joins `name` onto a directory path or base URL.
    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        match self {
            Self::File(dir) => Self::File(dir.join(name)),
            Self::Url(base) => Self::Url(format!("{}/{name}", base.trim_end_matches('/'))),
        }
    }

    async fn read(&self) -> Result<String, SourceError> {
        match self {
            Self::File(path) => read_file(path).await,
            Self::Url(url) => read_url(url).await,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

async fn read_file(path: &Path) -> Result<String, SourceError> {
    log::debug!("Reading {}", path.display());
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })
}

async fn read_url(url: &str) -> Result<String, SourceError> {
    log::debug!("Fetching {url}");
    let client = reqwest::Client::builder().build()?;
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    log::debug!("Fetched {} bytes from {url}", body.len());
    Ok(body)
}

/// A [`DataSource`] whose three resources are files or URLs.
#[derive(Debug, Clone)]
pub struct LocationSource {
    metadata: Location,
    sightings: Location,
    vessels: Location,
}

impl LocationSource {
    #[must_use]
    pub const fn new(metadata: Location, sightings: Location, vessels: Location) -> Self {
        Self {
            metadata,
            sightings,
            vessels,
        }
    }

    /// Uses the default filenames under a directory or base URL.
    #[must_use]
    pub fn in_directory(base: &Location) -> Self {
        Self::new(
            base.join(METADATA_FILENAME),
            base.join(SIGHTINGS_FILENAME),
            base.join(VESSELS_FILENAME),
        )
    }
}

#[async_trait]
impl DataSource for LocationSource {
    fn describe(&self) -> String {
        format!(
            "metadata={}, sightings={}, vessels={}",
            self.metadata, self.sightings, self.vessels
        )
    }

    async fn fetch_metadata(&self) -> Result<String, SourceError> {
        self.metadata.read().await
    }

    async fn fetch_sightings(&self) -> Result<String, SourceError> {
        self.sightings.read().await
    }

    async fn fetch_vessels(&self) -> Result<String, SourceError> {
        self.vessels.read().await
    }
}
