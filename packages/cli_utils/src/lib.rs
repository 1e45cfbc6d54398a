#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the turtle map tools.
//!
//! Logger setup plus the two progress displays the `turtle_map` binary
//! uses: a spinner while the dataset loads and a tick bar during playback.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Spinner shown while a dataset is being fetched.
#[must_use]
pub fn loading_spinner(multi: &MultiProgress, message: &str) -> ProgressBar {
    let bar = multi.add(ProgressBar::new_spinner());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar
}

/// Bar counting playback ticks, with the window label as its message.
#[must_use]
pub fn playback_bar(multi: &MultiProgress, total_ticks: u64) -> ProgressBar {
    let bar = multi.add(ProgressBar::new(total_ticks));
    bar.set_style(
        ProgressStyle::with_template(
            "{wide_bar:.green/dim} {pos}/{len} ticks [{elapsed_precise}] {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-"),
    );
    bar
}

/// Filter used when `RUST_LOG` is unset: our crates at `info`, everything
/// else at `warn`.
pub const DEFAULT_LOG_FILTER: &str = "warn,turtle_map=info";

/// Installs `pretty_env_logger` behind an `indicatif-log-bridge` wrapper and
/// returns the [`MultiProgress`] every bar in the process must join, so that
/// log lines are printed above the bars instead of tearing them.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.parse_filters(DEFAULT_LOG_FILTER),
    };
    let logger = builder.build();
    let max_level = logger.filter();

    // Fails only when a logger is already installed.
    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(max_level);
    }

    multi
}
