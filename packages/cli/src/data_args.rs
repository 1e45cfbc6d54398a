//! Dataset location flags.

use clap::Args;
use turtle_map_source::location::{METADATA_FILENAME, SIGHTINGS_FILENAME, VESSELS_FILENAME};
use turtle_map_source::{Location, LocationSource};

/// Where to load the dataset from. Each value may be a path or URL.
#[derive(Args, Debug, Default)]
pub struct DataArgs {
    /// Directory or base URL holding `metadata.json`, `sightings.csv`, `vessels.csv`
    #[arg(long, global = true)]
    pub data_dir: Option<String>,
    /// Metadata JSON (overrides `--data-dir`)
    #[arg(long, global = true)]
    pub metadata: Option<String>,
    /// Sightings/trends CSV (overrides `--data-dir`)
    #[arg(long, global = true)]
    pub sightings: Option<String>,
    /// Vessel presence CSV (overrides `--data-dir`)
    #[arg(long, global = true)]
    pub vessels: Option<String>,
}

impl DataArgs {
    /// Resolves the flags into a [`LocationSource`].
    ///
    /// # Errors
    ///
    /// Returns an error naming the missing flag when a resource has neither
    /// an explicit location nor a `--data-dir` to default from.
    pub fn to_source(&self) -> Result<LocationSource, String> {
        let base = self.data_dir.as_deref().map(Location::parse);

        let resolve = |explicit: Option<&String>, default_name: &str, flag: &str| {
            explicit
                .map(|s| Location::parse(s))
                .or_else(|| base.as_ref().map(|b| b.join(default_name)))
                .ok_or_else(|| format!("missing --{flag} (or --data-dir)"))
        };

        Ok(LocationSource::new(
            resolve(self.metadata.as_ref(), METADATA_FILENAME, "metadata")?,
            resolve(self.sightings.as_ref(), SIGHTINGS_FILENAME, "sightings")?,
            resolve(self.vessels.as_ref(), VESSELS_FILENAME, "vessels")?,
        ))
    }
}
