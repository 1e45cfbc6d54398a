#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Headless command-line front end for the turtle map viewer.
//!
//! Loads a dataset (local files or `http(s)` URLs), then inspects a single
//! window or runs playback without a map, logging proximity alerts and
//! optionally exporting each window as `GeoJSON`.
//!
//! Uses `indicatif-log-bridge` (via [`turtle_map_cli_utils::init_logger`])
//! so that log lines and progress bars never fight for the terminal.

mod data_args;
mod play;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use turtle_map_cli_utils::MultiProgress;
use turtle_map_viewer::{ViewerConfig, ViewerSession};

use crate::data_args::DataArgs;

#[derive(Parser)]
#[command(name = "turtle_map", about = "Turtle sighting and vessel proximity viewer")]
struct Cli {
    /// Viewer config TOML (defaults to `$TURTLE_MAP_CONFIG`, then built-ins)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    data: DataArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print record counts and the dataset's time span
    Summary {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the window, layer counts, and alert for one cursor position
    Frame {
        /// Cursor position (days, or weeks in week mode)
        #[arg(long, default_value_t = 0.0)]
        cursor: f64,
        /// Write the frame as a `GeoJSON` `FeatureCollection`
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
    /// Run playback for a number of ticks
    Play(play::PlayArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = turtle_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = ViewerConfig::resolve(cli.config.as_deref())?;
    let source = cli.data.to_source()?;

    let session = load_session(&multi, config, &source).await?;

    match cli.command {
        Commands::Summary { json } => {
            let Some(summary) = session.summary() else {
                return Err("dataset not loaded".into());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{summary}");
            }
        }
        Commands::Frame { cursor, geojson } => {
            let mut session = session;
            session.set_cursor(cursor);
            print_frame(&session);

            if let (Some(path), Some(frame)) = (geojson, session.frame()) {
                std::fs::write(&path, frame.to_geojson_string()?)?;
                log::info!("Wrote {}", path.display());
            }
        }
        Commands::Play(args) => play::run(&multi, session, &args).await?,
    }

    Ok(())
}

async fn load_session(
    multi: &MultiProgress,
    config: ViewerConfig,
    source: &turtle_map_source::LocationSource,
) -> Result<ViewerSession, Box<dyn std::error::Error>> {
    let spinner = turtle_map_cli_utils::loading_spinner(multi, "Loading dataset...");
    let session = ViewerSession::load(config, source).await;
    spinner.finish_and_clear();

    if session.is_ready() {
        Ok(session)
    } else {
        Err("dataset failed to load; see log for details".into())
    }
}

fn print_frame(session: &ViewerSession) {
    let Some(frame) = session.frame() else {
        println!("{}", session.label());
        return;
    };

    println!("{}", frame.label);
    println!(
        "  days {}..{}: {} sightings, {} trend points, {} vessel records",
        frame.window.start_day,
        frame.window.end_day_exclusive,
        frame.layers.sightings.len(),
        frame.layers.trends.len(),
        frame.layers.vessels.len()
    );
    if frame.proximity_alert {
        println!(
            "  PROXIMITY ALERT: vessel within {} degrees of a turtle",
            session.config().proximity_threshold_degrees
        );
    }
}
