#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Viewer session for the turtle map.
//!
//! Ties the record store, time window model, filter, proximity detector
//! and playback driver together behind one owning [`ViewerSession`]. A
//! front end drives the session through its control methods (cursor,
//! week navigation, play/pause, speed, frame ticks) and reads back the
//! current [`Frame`].

pub mod config;
pub mod frame;
pub mod session;
pub mod summary;

pub use config::{CONFIG_ENV_VAR, ConfigError, ViewerConfig};
pub use frame::Frame;
pub use session::{LoadState, SessionStats, ViewerSession};
pub use summary::DatasetSummary;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use turtle_map_source::{DataSource, SourceError};

    struct InlineSource {
        metadata: &'static str,
    }

    #[async_trait]
    impl DataSource for InlineSource {
        fn describe(&self) -> String {
            "inline".to_owned()
        }

        async fn fetch_metadata(&self) -> Result<String, SourceError> {
            Ok(self.metadata.to_owned())
        }

        async fn fetch_sightings(&self) -> Result<String, SourceError> {
            Ok("latitude,longitude,time_index,is_trend\n45.0,-62.0,9,false\n".to_owned())
        }

        async fn fetch_vessels(&self) -> Result<String, SourceError> {
            Ok("latitude,longitude,date,id,presence_hours\n45.0,-61.8,2023-06-10,v,1.0\n"
                .to_owned())
        }
    }

    #[tokio::test]
    async fn loaded_session_detects_vessel_on_converted_date() {
        let mut session = ViewerSession::load(
            ViewerConfig::default(),
            &InlineSource {
                metadata: r#"{"minDate": "2023-06-01", "maxTimeIndex": 20}"#,
            },
        )
        .await;

        assert!(session.is_ready());
        assert!(!session.proximity_alert());
        assert!(session.frame().unwrap().layers.vessels.is_empty());

        session.set_cursor(7.0);
        assert_eq!(session.frame().unwrap().layers.vessels.len(), 1);
        assert!(session.proximity_alert());
    }

    #[tokio::test]
    async fn unparsable_metadata_fails_the_session() {
        let session = ViewerSession::load(
            ViewerConfig::default(),
            &InlineSource {
                metadata: "not json",
            },
        )
        .await;

        assert!(matches!(session.load_state(), LoadState::Failed { .. }));
        assert!(session.frame().is_none());
        assert_eq!(session.stats(), SessionStats::default());
    }
}
