// ABOUTME: Connector syncing activities from a paginated remote activity API
// ABOUTME: Maps remote summary fields to a stats overlay and fetches streams per activity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Paginated activity streaming
pub mod activity_iterator;

pub use activity_iterator::{create_activity_stream, RemoteActivityStream, StreamConfig};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures_util::StreamExt;
use pierre_core::errors::SyncErrorCode;
use pierre_core::models::{
    ActivityExtras, ActivityStats, BareActivity, ConnectorType, HeartRateStats, PaceStats,
    PowerStats, SportType, SpeedStats, Streams, SyncErrorDetails,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::base::{record_error_details, spawn_run, ActiveConfig, RunOutcome, SyncStart};
use super::{Connector, ConnectorBase, SourceActivity};
use crate::compute::ComputeWorker;
use crate::context::RuntimeContext;
use crate::events::SyncEventStream;
use crate::store::LocalActivityStore;

/// Activity summary as listed by a remote API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteActivity {
    /// Remote identifier
    pub id: String,
    /// Title
    pub name: String,
    /// Remote sport label
    pub sport_type: String,
    /// Start instant
    pub start_date: DateTime<Utc>,
    /// Elapsed time (s)
    pub elapsed_time: Option<f64>,
    /// Moving time (s)
    pub moving_time: Option<f64>,
    /// Distance (m)
    pub distance: Option<f64>,
    /// Average speed (m/s)
    pub average_speed: Option<f64>,
    /// Maximum speed (m/s)
    pub max_speed: Option<f64>,
    /// Average heart rate (bpm)
    pub average_heartrate: Option<f64>,
    /// Maximum heart rate (bpm)
    pub max_heartrate: Option<f64>,
    /// Average power (watts)
    pub average_watts: Option<f64>,
    /// Work (kJ)
    pub kilojoules: Option<f64>,
    /// Calories (kcal)
    pub calories: Option<f64>,
    /// Elevation gain (m)
    pub total_elevation_gain: Option<f64>,
    /// Power comes from a power meter
    pub device_watts: bool,
    /// Recorded on a home trainer
    pub trainer: bool,
    /// Tagged as commute
    pub commute: bool,
    /// Manually entered
    pub manual: bool,
    /// Recording device
    pub device_name: Option<String>,
}

impl RemoteActivity {
    /// Recorded facts of the activity
    ///
    /// # Errors
    ///
    /// Returns `RemoteSourceError::InvalidActivity` if the elapsed time is not
    /// finite or puts the end instant out of the representable range
    pub fn to_bare(&self) -> Result<BareActivity, RemoteSourceError> {
        let elapsed = self.elapsed_time.unwrap_or_default();
        let end_time = elapsed
            .is_finite()
            .then(|| Duration::try_milliseconds((elapsed.max(0.0) * 1000.0) as i64))
            .flatten()
            .and_then(|elapsed| self.start_date.checked_add_signed(elapsed))
            .ok_or_else(|| {
                RemoteSourceError::InvalidActivity(format!(
                    "elapsed time {elapsed} s out of range for activity {}",
                    self.id
                ))
            })?;

        Ok(BareActivity {
            id: String::new(),
            name: self.name.clone(),
            sport: SportType::from_provider_string(&self.sport_type),
            start_time: self.start_date,
            end_time,
            has_power_meter: self.device_watts,
            trainer: self.trainer,
            commute: self.commute,
            manual: self.manual,
        })
    }
}

/// Failures of a remote source
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteSourceError {
    /// Credentials were refused
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Any other failure of the remote source
    #[error("remote source failure: {0}")]
    Source(String),

    /// A listed activity carries values that cannot describe an activity
    #[error("invalid remote activity: {0}")]
    InvalidActivity(String),
}

/// Paginated remote activity API
#[async_trait]
pub trait RemoteActivitySource: Send + Sync + 'static {
    /// Activities of page `page` (from 1), most recent first
    async fn list_activities(
        &self,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<RemoteActivity>, RemoteSourceError>;

    /// Streams of an activity
    async fn fetch_streams(&self, remote_id: &str) -> Result<Streams, RemoteSourceError>;
}

/// Syncs activities from a [`RemoteActivitySource`]
pub struct RemoteApiConnector<S: RemoteActivitySource> {
    base: ConnectorBase,
    source: Arc<S>,
    stream_config: StreamConfig,
}

impl<S: RemoteActivitySource> RemoteApiConnector<S> {
    /// Create a connector over `source` with the default page size
    #[must_use]
    pub fn new(
        context: Arc<RuntimeContext>,
        store: Arc<dyn LocalActivityStore>,
        worker: Arc<dyn ComputeWorker>,
        source: Arc<S>,
    ) -> Self {
        Self {
            base: ConnectorBase::new(ConnectorType::RemoteApi, context, store, worker),
            source,
            stream_config: StreamConfig::default(),
        }
    }

    /// Change the page size, clamped to the allowed range
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.stream_config = StreamConfig::with_page_size(page_size);
        self
    }

    /// Paging settings
    #[must_use]
    pub const fn stream_config(&self) -> StreamConfig {
        self.stream_config
    }

    async fn run(&self, stream: &SyncEventStream, config: &ActiveConfig) -> RunOutcome {
        let mut activities = create_activity_stream(self.source.as_ref(), self.stream_config);

        while let Some(listed) = activities.next().await {
            if self.base.should_stop(stream) {
                return RunOutcome::Stopped;
            }
            let remote = match listed {
                Ok(remote) => remote,
                Err(RemoteSourceError::Unauthorized(reason)) => {
                    return RunOutcome::Failed(SyncErrorDetails::new(
                        SyncErrorCode::RemoteUnauthorized,
                        reason,
                    ));
                }
                Err(err) => {
                    return RunOutcome::Failed(SyncErrorDetails::new(
                        SyncErrorCode::RemoteSourceError,
                        err.to_string(),
                    ));
                }
            };

            if config
                .sync_from
                .is_some_and(|since| remote.start_date < since)
            {
                // Listing is most recent first: everything after is older
                debug!(remote_id = %remote.id, "Reached sync lower bound");
                break;
            }

            self.sync_remote_activity(stream, config, remote).await;
        }

        if self.base.should_stop(stream) {
            RunOutcome::Stopped
        } else {
            RunOutcome::Completed
        }
    }

    async fn sync_remote_activity(
        &self,
        stream: &SyncEventStream,
        config: &ActiveConfig,
        remote: RemoteActivity,
    ) {
        let bare = match remote.to_bare() {
            Ok(bare) => bare,
            Err(err) => {
                warn!(remote_id = %remote.id, error = %err, "Skipping invalid remote activity");
                self.base.emit_error(
                    stream,
                    SyncErrorDetails::new(SyncErrorCode::RemoteSourceError, err.to_string())
                        .for_activity(&remote.name),
                );
                return;
            }
        };

        let streams = if remote.manual {
            None
        } else {
            match self.source.fetch_streams(&remote.id).await {
                Ok(streams) => Some(streams),
                Err(err) => {
                    warn!(remote_id = %remote.id, error = %err, "Unable to fetch activity streams");
                    self.base.emit_error(
                        stream,
                        SyncErrorDetails::new(SyncErrorCode::StreamsUnavailable, err.to_string())
                            .for_activity(&remote.name),
                    );
                    return;
                }
            }
        };

        if self.base.should_stop(stream) {
            debug!(remote_id = %remote.id, "Run stopping, remote activity left unprocessed");
            return;
        }
        let source_stats = self.get_source_stats(&bare.sport, &remote, streams.as_ref());
        let record = SourceActivity {
            bare,
            streams,
            source_stats,
            laps: Vec::new(),
            device: remote.device_name.clone(),
            extras: ActivityExtras {
                remote_activity_id: Some(remote.id.clone()),
                file: None,
            },
        };

        match self.base.process_activity(config, record).await {
            Ok(processed) => {
                self.base
                    .emit(stream, processed.into_event(ConnectorType::RemoteApi));
            }
            Err(err) => {
                warn!(remote_id = %remote.id, error = %err, "Activity processing failed");
                self.base
                    .emit_error(stream, record_error_details(&err, &remote.name));
            }
        }
    }
}

#[async_trait]
impl<S: RemoteActivitySource> Connector for RemoteApiConnector<S> {
    type Source = RemoteActivity;

    fn base(&self) -> &ConnectorBase {
        &self.base
    }

    fn sync(self: Arc<Self>) -> SyncEventStream {
        match self.base.begin_sync() {
            SyncStart::Rejected(stream) => stream,
            SyncStart::Run { stream, config } => {
                info!(page_size = self.stream_config.page_size, "Remote sync starting");
                let runner = Arc::clone(&self);
                let run_stream = stream.clone();
                spawn_run(self, stream.clone(), async move {
                    runner.run(&run_stream, &config).await
                });
                stream
            }
        }
    }

    fn get_source_stats(
        &self,
        sport: &SportType,
        source: &RemoteActivity,
        _streams: Option<&Streams>,
    ) -> ActivityStats {
        let mut stats = ActivityStats {
            distance: source.distance,
            elevation_gain: source.total_elevation_gain,
            elapsed_time: source.elapsed_time,
            moving_time: source.moving_time,
            calories: source.calories,
            ..ActivityStats::default()
        };

        if source.average_speed.is_some() || source.max_speed.is_some() {
            stats.speed = Some(SpeedStats {
                avg: source.average_speed,
                max: source.max_speed,
                ..SpeedStats::default()
            });
            if sport.is_paced() {
                let unit = if sport.is_swim() { 100.0 } else { 1000.0 };
                let to_pace = |speed: f64| (speed > 0.0).then(|| unit / speed);
                stats.pace = Some(PaceStats {
                    avg: source.average_speed.and_then(to_pace),
                    max: source.max_speed.and_then(to_pace),
                    ..PaceStats::default()
                });
            }
        }
        if source.average_heartrate.is_some() || source.max_heartrate.is_some() {
            stats.heart_rate = Some(HeartRateStats {
                avg: source.average_heartrate,
                max: source.max_heartrate,
                ..HeartRateStats::default()
            });
        }
        if source.average_watts.is_some() || source.kilojoules.is_some() {
            stats.power = Some(PowerStats {
                avg: source.average_watts,
                work: source.kilojoules,
                ..PowerStats::default()
            });
        }
        stats
    }
}
