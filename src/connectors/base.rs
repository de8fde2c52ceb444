// ABOUTME: Behavior shared by every connector: configuration, run lifecycle, base properties
// ABOUTME: Composes the stop controller, snapshot resolver, stats pipeline and debug uploader
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::error::Error;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use pierre_core::errors::{ConnectorError, ConnectorResult, StoreError, SyncErrorCode};
use pierre_core::models::{
    Activity, ActivityExtras, ActivityStats, AthleteSnapshot, BareActivity, ConnectorType, Lap,
    Streams, SyncErrorDetails, SyncEvent, UserSettings,
};
use tokio::task::JoinError;
use tracing::{debug, error, info};

use super::{Connector, ConnectorConfig};
use crate::compute::{ActivityComputeResponse, ActivityStatsPipeline, ComputeWorker};
use crate::context::RuntimeContext;
use crate::debug_upload::DebugUploader;
use crate::events::SyncEventStream;
use crate::identity::{content_hash, generate_activity_id};
use crate::resolvers::AthleteSnapshotResolver;
use crate::stop::StopController;
use crate::store::LocalActivityStore;

/// Configuration accepted by `configure()` with its derived state
#[derive(Debug)]
pub struct ActiveConfig {
    /// Configuration as given
    pub config: ConnectorConfig,
    /// Resolver built from the athlete history
    pub resolver: AthleteSnapshotResolver,
    /// Normalized sync lower bound
    pub sync_from: Option<DateTime<Utc>>,
}

/// Outcome of `ConnectorBase::begin_sync`
#[derive(Debug)]
pub enum SyncStart {
    /// A run started; STARTED is already on the stream
    Run {
        /// Stream of the new run
        stream: SyncEventStream,
        /// Configuration of the run
        config: Arc<ActiveConfig>,
    },
    /// No run started; the closed stream explains why
    Rejected(SyncEventStream),
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every record was processed
    Completed,
    /// The run honored a stop request
    Stopped,
    /// The source became unusable
    Failed(SyncErrorDetails),
}

impl RunOutcome {
    /// Outcome of a run task that panicked or was cancelled
    #[must_use]
    pub fn aborted(err: &JoinError) -> Self {
        Self::Failed(SyncErrorDetails::new(
            SyncErrorCode::UnhandledError,
            format!("sync run aborted: {err}"),
        ))
    }
}

/// Execute `run` on its own task, then end the run with its outcome
///
/// A run that panics ends with a fatal `UNHANDLED_ERROR_SYNC` so the
/// connector never stays in the syncing state.
pub fn spawn_run<C, F>(connector: Arc<C>, stream: SyncEventStream, run: F)
where
    C: Connector,
    F: Future<Output = RunOutcome> + Send + 'static,
{
    let task = tokio::spawn(run);
    tokio::spawn(async move {
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(connector = %connector.connector_type(), error = %err, "Sync run task aborted");
                RunOutcome::aborted(&err)
            }
        };
        connector.base().finish(&stream, outcome);
    });
}

/// A record pulled from a source, ready to be enriched
#[derive(Debug, Clone)]
pub struct SourceActivity {
    /// Recorded facts
    pub bare: BareActivity,
    /// Recorded streams, if any
    pub streams: Option<Streams>,
    /// Stats reported by the source
    pub source_stats: ActivityStats,
    /// Laps reported by the source
    pub laps: Vec<Lap>,
    /// Recording device
    pub device: Option<String>,
    /// Source-specific extras
    pub extras: ActivityExtras,
}

impl SourceActivity {
    /// Record with no streams, stats or extras
    #[must_use]
    pub fn new(bare: BareActivity) -> Self {
        Self {
            bare,
            streams: None,
            source_stats: ActivityStats::default(),
            laps: Vec::new(),
            device: None,
            extras: ActivityExtras::default(),
        }
    }
}

/// Result of processing one source record
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessedActivity {
    /// Not known locally, computed now
    New {
        /// Computed activity
        activity: Box<Activity>,
        /// Deflated streams
        deflated_streams: Option<String>,
    },
    /// Already known locally, left as stored
    Existing(Box<Activity>),
    /// Several local activities share the content hash
    Duplicated {
        /// Name of the incoming activity
        name: String,
        /// Number of matching local activities
        count: usize,
    },
}

impl ProcessedActivity {
    /// Event reporting this outcome
    #[must_use]
    pub fn into_event(self, connector: ConnectorType) -> SyncEvent {
        match self {
            Self::New {
                activity,
                deflated_streams,
            } => SyncEvent::activity(connector, *activity, true, deflated_streams),
            Self::Existing(activity) => SyncEvent::activity(connector, *activity, false, None),
            Self::Duplicated { name, count } => SyncEvent::error(
                connector,
                SyncErrorDetails::new(
                    SyncErrorCode::MultipleActivitiesFound,
                    format!("{count} local activities match '{name}'"),
                )
                .for_activity(name),
            ),
        }
    }
}

/// State and helpers composed into every concrete connector
pub struct ConnectorBase {
    connector: ConnectorType,
    context: Arc<RuntimeContext>,
    store: Arc<dyn LocalActivityStore>,
    pipeline: ActivityStatsPipeline,
    stop: StopController,
    uploader: DebugUploader,
    active: RwLock<Option<Arc<ActiveConfig>>>,
}

impl ConnectorBase {
    /// Create an unconfigured base
    #[must_use]
    pub fn new(
        connector: ConnectorType,
        context: Arc<RuntimeContext>,
        store: Arc<dyn LocalActivityStore>,
        worker: Arc<dyn ComputeWorker>,
    ) -> Self {
        let timeout = context.environment().stop_wait_timeout();
        Self {
            connector,
            stop: StopController::new(connector, timeout),
            uploader: DebugUploader::new(Arc::clone(&context)),
            pipeline: ActivityStatsPipeline::new(worker),
            context,
            store,
            active: RwLock::new(None),
        }
    }

    /// Connector kind
    #[must_use]
    pub const fn connector_type(&self) -> ConnectorType {
        self.connector
    }

    /// Runtime context
    #[must_use]
    pub const fn context(&self) -> &Arc<RuntimeContext> {
        &self.context
    }

    /// Stop controller holding the runtime flags
    #[must_use]
    pub const fn stop_controller(&self) -> &StopController {
        &self.stop
    }

    /// Debug uploader of this connector instance
    #[must_use]
    pub const fn uploader(&self) -> &DebugUploader {
        &self.uploader
    }

    /// Tell whether a run is in progress
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.stop.is_syncing()
    }

    /// Tell whether the current run was asked to stop
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.stop.is_stop_requested()
    }

    /// Tell whether the run owning `stream` must stop processing records
    #[must_use]
    pub fn should_stop(&self, stream: &SyncEventStream) -> bool {
        self.stop.should_stop(stream)
    }

    /// Validate and store `config`, then reset the runtime flags
    ///
    /// Idempotent; meant to be called before every `sync()`.
    ///
    /// # Errors
    ///
    /// - `SyncInProgress` while a run is in progress
    /// - `InvalidConfig` if the configuration targets another connector kind
    /// - `EmptyAthleteHistory` if the athlete history is empty
    pub fn configure(&self, config: ConnectorConfig) -> ConnectorResult<()> {
        if self.stop.is_syncing() {
            return Err(ConnectorError::SyncInProgress {
                connector: self.connector,
            });
        }
        if config.connector != self.connector {
            return Err(ConnectorError::invalid_config(format!(
                "configuration for {} given to {} connector",
                config.connector, self.connector
            )));
        }

        let resolver = AthleteSnapshotResolver::new(&config.athlete_profile)?;
        let sync_from = config.sync_from();
        info!(
            connector = %self.connector,
            priority = config.priority,
            sync_from = ?sync_from,
            history_entries = resolver.len(),
            "Connector configured"
        );

        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(ActiveConfig {
            config,
            resolver,
            sync_from,
        }));
        self.stop.reset();
        Ok(())
    }

    /// Configuration of the connector
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` before the first successful `configure()`
    pub fn active_config(&self) -> ConnectorResult<Arc<ActiveConfig>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ConnectorError::NotConfigured {
                connector: self.connector,
            })
    }

    /// Start a run, or explain on a closed stream why none started
    ///
    /// A rejected start leaves the runtime state untouched.
    #[must_use]
    pub fn begin_sync(&self) -> SyncStart {
        let config = match self.active_config() {
            Ok(config) => config,
            Err(err) => {
                return SyncStart::Rejected(self.rejected_stream(SyncErrorDetails::new(
                    SyncErrorCode::UnhandledError,
                    err.to_string(),
                )));
            }
        };

        let Some(stream) = self.stop.begin_run() else {
            debug!(connector = %self.connector, "Sync requested while already syncing");
            return SyncStart::Rejected(self.rejected_stream(SyncErrorDetails::new(
                SyncErrorCode::SyncAlreadyStarted,
                format!("{} connector is already syncing", self.connector),
            )));
        };

        info!(connector = %self.connector, "Sync started");
        stream.push(SyncEvent::started(self.connector));
        SyncStart::Run { stream, config }
    }

    fn rejected_stream(&self, details: SyncErrorDetails) -> SyncEventStream {
        SyncEventStream::closed_with(vec![SyncEvent::error(self.connector, details.fatal())])
    }

    /// Publish an event on a run stream
    pub fn emit(&self, stream: &SyncEventStream, event: SyncEvent) {
        let _delivered = self.try_emit(stream, event);
    }

    /// Publish an event on a run stream, telling whether it was delivered
    #[must_use]
    pub fn try_emit(&self, stream: &SyncEventStream, event: SyncEvent) -> bool {
        let delivered = stream.push(event);
        if !delivered {
            debug!(connector = %self.connector, "Event emitted after the run closed, dropped");
        }
        delivered
    }

    /// Publish a non-fatal ERROR event
    pub fn emit_error(&self, stream: &SyncEventStream, details: SyncErrorDetails) {
        self.emit(stream, SyncEvent::error(self.connector, details));
    }

    /// End a run: mark the connector idle and publish the terminal event
    pub fn finish(&self, stream: &SyncEventStream, outcome: RunOutcome) {
        let terminal = match outcome {
            RunOutcome::Completed => {
                info!(connector = %self.connector, "Sync completed");
                SyncEvent::complete(self.connector)
            }
            RunOutcome::Stopped => {
                info!(connector = %self.connector, "Sync stopped");
                SyncEvent::stopped(self.connector)
            }
            RunOutcome::Failed(details) => {
                info!(connector = %self.connector, code = ?details.code, "Sync failed");
                SyncEvent::error(self.connector, details.fatal())
            }
        };
        self.stop.finish_run(stream, terminal);
    }

    /// Ask the running sync to stop and wait for it
    ///
    /// # Errors
    ///
    /// See [`StopController::stop`]
    pub async fn stop(&self) -> ConnectorResult<()> {
        self.stop.stop().await
    }

    /// Local activities overlapping `[start, end]`
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Store` if the store fails
    pub async fn find_local_activities(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ConnectorResult<Vec<Activity>> {
        Ok(self.store.find_local_activities(start, end).await?)
    }

    /// Inflated streams of a local activity
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Store` if the store fails or holds corrupted streams
    pub async fn find_streams(&self, activity_id: &str) -> ConnectorResult<Option<Streams>> {
        let Some(deflated) = self.store.find_deflated_streams(activity_id).await? else {
            return Ok(None);
        };
        let streams = Streams::inflate(&deflated.deflated_streams).map_err(|err| {
            StoreError::CorruptedStreams {
                activity_id: activity_id.to_owned(),
                reason: err.to_string(),
            }
        })?;
        Ok(Some(streams))
    }

    /// Stamp identity, connector, timestamps and pool detection on a new activity
    pub fn assign_base_properties(&self, activity: &mut Activity, streams: Option<&Streams>) {
        activity.bare.id = generate_activity_id(&activity.bare);
        activity.hash = content_hash(&activity.bare);
        activity.connector = Some(self.connector);

        let now = Utc::now();
        activity.creation_time = now;
        activity.last_edit_time = now;
        activity.auto_detected_type = false;

        // Swims without positions are pool swims
        if activity.sport().is_swim() {
            activity.is_swim_pool = Some(!streams.is_some_and(Streams::has_positions));
        }
    }

    /// Send an activity to the compute worker
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Compute` with the worker failure
    pub async fn compute_activity(
        &self,
        activity: Activity,
        athlete_snapshot: AthleteSnapshot,
        user_settings: UserSettings,
        streams: Option<Streams>,
        deflate_streams: bool,
    ) -> ConnectorResult<ActivityComputeResponse> {
        Ok(self
            .pipeline
            .compute_activity(
                activity,
                athlete_snapshot,
                user_settings,
                streams,
                deflate_streams,
            )
            .await?)
    }

    /// Deduplicate, enrich and compute one source record
    ///
    /// A single local activity with the same content hash is returned as
    /// existing, without recomputation.
    ///
    /// # Errors
    ///
    /// Returns store, compute or merge failures; the caller decides whether
    /// they end the run
    pub async fn process_activity(
        &self,
        config: &ActiveConfig,
        record: SourceActivity,
    ) -> ConnectorResult<ProcessedActivity> {
        let SourceActivity {
            bare,
            streams,
            source_stats,
            laps,
            device,
            extras,
        } = record;

        let hash = content_hash(&bare);
        let mut matches: Vec<Activity> = self
            .find_local_activities(bare.start_time, bare.end_time)
            .await?
            .into_iter()
            .filter(|local| local.hash == hash)
            .collect();
        match matches.len() {
            0 => {}
            1 => {
                if let Some(existing) = matches.pop() {
                    debug!(activity_id = %existing.id(), "Activity already synced");
                    return Ok(ProcessedActivity::Existing(Box::new(existing)));
                }
            }
            count => {
                return Ok(ProcessedActivity::Duplicated {
                    name: bare.name,
                    count,
                });
            }
        }

        let resolved = config.resolver.resolve(bare.start_time);
        let mut activity = Activity::new(bare, resolved.snapshot.clone());
        activity.settings_lack = resolved.settings_lack.then_some(true);
        activity.laps = laps;
        activity.device = device;
        activity.extras = extras;
        self.assign_base_properties(&mut activity, streams.as_ref());

        let response = self
            .compute_activity(
                activity,
                resolved.snapshot,
                config.config.user_settings.clone(),
                streams,
                true,
            )
            .await?;

        let mut computed = response.computed_activity;
        let computed_stats = computed.stats.clone();
        ActivityStatsPipeline::apply_source_stats(&mut computed, source_stats, &computed_stats)?;

        Ok(ProcessedActivity::New {
            activity: Box::new(computed),
            deflated_streams: response.deflated_streams,
        })
    }
}

/// Map a record processing failure to a non-fatal ERROR payload
#[must_use]
pub fn record_error_details(err: &ConnectorError, activity_name: &str) -> SyncErrorDetails {
    let code = match err {
        ConnectorError::Compute { .. } => SyncErrorCode::ComputeFailed,
        ConnectorError::Store {
            source: StoreError::CorruptedStreams { .. },
        }
        | ConnectorError::Streams { .. } => SyncErrorCode::StreamsUnavailable,
        _ => SyncErrorCode::UnhandledError,
    };
    SyncErrorDetails::new(code, error_chain(err)).for_activity(activity_name)
}

/// Render an error with its sources, outermost first
fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
