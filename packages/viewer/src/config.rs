//! Viewer configuration loaded from an optional TOML file.
//!
//! Every field has a default, so an empty or missing file yields a working
//! configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use turtle_map_playback::{DEFAULT_SPEED, DEFAULT_TICKS_PER_SECOND, MIN_TICKS_PER_SECOND, Pacing};
use turtle_map_spatial::DEFAULT_THRESHOLD_DEGREES;
use turtle_map_timeline::CursorMode;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "TURTLE_MAP_CONFIG";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`ViewerConfig`].
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}

/// Tunables for a [`crate::ViewerSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Turtle/vessel distance, in degrees, below which the alert fires.
    pub proximity_threshold_degrees: f64,
    /// Frame rate assumed by fixed-rate playback pacing.
    pub ticks_per_second: f64,
    /// Playback speed at startup, in days per second.
    pub initial_speed: f64,
    /// Continuous (sliding day) or discrete (week) cursor.
    pub cursor_mode: CursorMode,
    /// Fixed per-tick advance or measured frame time.
    pub pacing: Pacing,
    /// Whether predicted trend points count as turtles for the alert.
    ///
    /// Off by default: the alert then considers observed sightings only,
    /// even though trends are loaded from the same turtle CSV.
    pub include_trends_in_alert: bool,
    /// Vessel count at which the alert switches from a pairwise scan to an
    /// R-tree lookup. `0` disables the R-tree.
    pub spatial_index_min_vessels: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_degrees: DEFAULT_THRESHOLD_DEGREES,
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            initial_speed: DEFAULT_SPEED,
            cursor_mode: CursorMode::default(),
            pacing: Pacing::default(),
            include_trends_in_alert: false,
            spatial_index_min_vessels: 512,
        }
    }
}

impl ViewerConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the TOML is malformed or a value is out of
    /// range.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded viewer config from {}", path.display());
        Ok(config)
    }

    /// Loads from `path` if given, else from [`CONFIG_ENV_VAR`] if set,
    /// else returns defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a named file cannot be read or parsed.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match std::env::var(CONFIG_ENV_VAR) {
            Ok(env_path) if !env_path.is_empty() => Self::load(Path::new(&env_path)),
            _ => {
                log::debug!("No viewer config given, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.proximity_threshold_degrees.is_finite() || self.proximity_threshold_degrees < 0.0
        {
            return Err(ConfigError::Invalid {
                message: format!(
                    "proximity_threshold_degrees must be a non-negative number, got {}",
                    self.proximity_threshold_degrees
                ),
            });
        }
        if !self.ticks_per_second.is_finite() || self.ticks_per_second < MIN_TICKS_PER_SECOND {
            return Err(ConfigError::Invalid {
                message: format!(
                    "ticks_per_second must be at least {MIN_TICKS_PER_SECOND}, got {}",
                    self.ticks_per_second
                ),
            });
        }
        if !self.initial_speed.is_finite() {
            return Err(ConfigError::Invalid {
                message: format!("initial_speed must be finite, got {}", self.initial_speed),
            });
        }
        Ok(())
    }
}
