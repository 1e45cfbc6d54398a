#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Spatial-temporal filtering and proximity detection.
//!
//! [`filter`] selects the records that fall inside the active time window;
//! [`proximity`] decides whether any turtle in that window is close enough
//! to a vessel to raise an alert. Everything here is a pure function of
//! its inputs and never touches the record store's contents.

pub mod filter;
pub mod proximity;

pub use filter::{FilteredLayers, filter_in_window, filter_store};
pub use proximity::{DEFAULT_THRESHOLD_DEGREES, ProximityIndex, detect_proximity};
