//! Headless playback loop.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use turtle_map_cli_utils::MultiProgress;
use turtle_map_viewer::{Frame, ViewerSession};

#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Number of frame ticks to run
    #[arg(long, default_value_t = 600)]
    pub ticks: u64,
    /// Playback speed (clamped to 0.1..=5.0)
    #[arg(long)]
    pub speed: Option<f64>,
    /// Cursor position to start from
    #[arg(long, default_value_t = 0.0)]
    pub start: f64,
    /// Write one `window_NNNN.geojson` per distinct window into this directory
    #[arg(long)]
    pub export_dir: Option<PathBuf>,
    /// Sleep between ticks and feed measured elapsed time to the session
    #[arg(long)]
    pub realtime: bool,
}

/// Totals gathered over a playback run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlayOutcome {
    pub ticks: u64,
    pub windows: u64,
    pub alert_windows: u64,
}

pub async fn run(
    multi: &MultiProgress,
    mut session: ViewerSession,
    args: &PlayArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = &args.export_dir {
        std::fs::create_dir_all(dir)?;
    }

    session.set_cursor(args.start);
    if let Some(speed) = args.speed {
        let applied = session.set_speed(speed);
        log::info!("Playback speed {applied:.1}x");
    }

    let bar = turtle_map_cli_utils::playback_bar(multi, args.ticks);
    let outcome = drive(&mut session, args, |frame, tick| {
        bar.set_position(tick);
        bar.set_message(frame.label.clone());
        match &args.export_dir {
            Some(dir) => export_frame(dir, frame),
            None => Ok(()),
        }
    })
    .await?;
    bar.finish_and_clear();

    println!(
        "Ran {} ticks: {} windows, {} with a proximity alert",
        outcome.ticks, outcome.windows, outcome.alert_windows
    );
    println!("Final window: {}", session.label());

    Ok(())
}

/// Plays `args.ticks` frames, calling `on_window` for the starting window and
/// again whenever the visible window changes.
async fn drive<F>(
    session: &mut ViewerSession,
    args: &PlayArgs,
    mut on_window: F,
) -> Result<PlayOutcome, Box<dyn std::error::Error>>
where
    F: FnMut(&Frame, u64) -> Result<(), Box<dyn std::error::Error>>,
{
    let frame_interval = Duration::try_from_secs_f64(1.0 / session.config().ticks_per_second)?;
    let mut outcome = PlayOutcome::default();

    let Some(first) = session.frame() else {
        return Ok(outcome);
    };
    let mut last_window = first.window;
    outcome.windows = 1;
    if first.proximity_alert {
        outcome.alert_windows = 1;
    }
    on_window(first, 0)?;

    session.play();
    let mut last_tick = Instant::now();

    for tick in 1..=args.ticks {
        let elapsed = if args.realtime {
            tokio::time::sleep(frame_interval).await;
            let now = Instant::now();
            let elapsed = now.duration_since(last_tick);
            last_tick = now;
            elapsed
        } else {
            frame_interval
        };

        session.tick(elapsed);
        outcome.ticks = tick;

        let Some(frame) = session.frame() else {
            break;
        };
        if frame.window != last_window {
            last_window = frame.window;
            outcome.windows += 1;
            if frame.proximity_alert {
                outcome.alert_windows += 1;
            }
            on_window(frame, tick)?;
        }
    }

    session.pause();
    Ok(outcome)
}

fn export_frame(dir: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
    let path = dir.join(format!("window_{:04}.geojson", frame.window.start_day));
    std::fs::write(&path, frame.to_geojson_string()?)?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use turtle_map_records_models::{DatasetMetadata, RecordStore, TurtleRecord, VesselRecord};
    use turtle_map_viewer::ViewerConfig;

    fn ready_session() -> ViewerSession {
        let min_date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let mut session = ViewerSession::new(ViewerConfig::default());
        session.finish_loading(RecordStore::new(
            DatasetMetadata {
                min_date,
                max_time_index: 20,
            },
            vec![TurtleRecord::sighting(45.0, -62.0, 8)],
            vec![VesselRecord {
                latitude: 45.0,
                longitude: -61.9,
                date: NaiveDate::from_ymd_opt(2023, 6, 10).unwrap(),
                presence_hours: 2.0,
            }],
        ));
        session
    }

    fn args(ticks: u64) -> PlayArgs {
        PlayArgs {
            ticks,
            speed: None,
            start: 0.0,
            export_dir: None,
            realtime: false,
        }
    }

    #[tokio::test]
    async fn playback_visits_each_day_window_and_wraps() {
        let mut session = ready_session();
        let mut starts = Vec::new();

        // 60 ticks per day at speed 1.0; passes day 19 then wraps to 0.
        let outcome = drive(&mut session, &args(60 * 22), |frame, _| {
            starts.push(frame.window.start_day);
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(starts.first(), Some(&0));
        let day_19 = starts.iter().position(|&start| start == 19).unwrap();
        assert!(starts[day_19 + 1..].contains(&0));
        assert!(outcome.alert_windows > 0);
        assert!(!session.tick(Duration::from_millis(16)));
    }

    #[tokio::test]
    async fn unrepresentable_frame_interval_is_an_error() {
        let mut session = ViewerSession::new(ViewerConfig {
            ticks_per_second: 0.0,
            ..ViewerConfig::default()
        });
        assert!(drive(&mut session, &args(1), |_, _| Ok(())).await.is_err());
    }

    #[tokio::test]
    async fn exports_one_file_per_window() {
        let dir = std::env::temp_dir().join(format!("turtle_map_play_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut session = ready_session();
        drive(&mut session, &args(60 * 2), |frame, _| export_frame(&dir, frame))
            .await
            .unwrap();

        assert!(dir.join("window_0000.geojson").exists());
        assert!(dir.join("window_0001.geojson").exists());
        let text = std::fs::read_to_string(dir.join("window_0000.geojson")).unwrap();
        assert!(text.contains("FeatureCollection"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
