// ABOUTME: Shared test utilities and fixtures for activity sync integration tests
// ABOUTME: Provides logging, runtime context, athlete history, scripted workers and connectors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
//! Shared test utilities for `pierre_activity_sync`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pierre_activity_sync::compute::{
    ActivityComputeRequest, ActivityComputeResponse, ComputeWorker,
};
use pierre_activity_sync::config::SyncEnvironment;
use pierre_activity_sync::connectors::{Connector, ConnectorBase, RunOutcome, SyncStart};
use pierre_activity_sync::context::{RuntimeContext, RuntimeInfo};
use pierre_activity_sync::events::SyncEventStream;
use pierre_activity_sync::store::InMemoryActivityStore;
use pierre_core::errors::ComputeError;
use pierre_core::models::{
    ActivityStats, AthleteProfileHistory, AthleteSettings, ConnectorType, DatedAthleteSettings,
    Gender, PowerStats, SportType, Streams, SyncErrorDetails, SyncEvent, SyncEventPayload,
    SyncEventType,
};
use serde_json::{json, Value};
use tokio::time;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // Check for TEST_LOG environment variable to control test logging level
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN, // Default to WARN for quiet tests
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Fixed host information so machine ids are stable across runs
pub fn test_runtime_info() -> RuntimeInfo {
    RuntimeInfo::new(
        "linux",
        "x86_64",
        "test-host",
        "athlete",
        "0123456789abcdef0123456789abcdef",
        4,
    )
}

/// Runtime context with the default environment (debug uploads disabled)
pub fn test_context() -> Arc<RuntimeContext> {
    context_with(SyncEnvironment::default())
}

/// Runtime context with a custom environment
pub fn context_with(environment: SyncEnvironment) -> Arc<RuntimeContext> {
    init_test_logging();
    Arc::new(RuntimeContext::new(test_runtime_info(), environment))
}

/// Midnight UTC of the given day
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Cycling settings with the given FTP
pub fn settings_with_ftp(ftp: f64) -> AthleteSettings {
    AthleteSettings {
        cycling_ftp: Some(ftp),
        max_hr: Some(190.0),
        rest_hr: Some(50.0),
        weight: Some(70.0),
        ..AthleteSettings::default()
    }
}

/// History: FTP 200 from 2020-01-01, FTP 220 from 2021-06-01
pub fn ftp_history() -> AthleteProfileHistory {
    AthleteProfileHistory {
        gender: Gender::Men,
        history: vec![
            DatedAthleteSettings {
                valid_from: utc(2021, 6, 1),
                settings: settings_with_ftp(220.0),
            },
            DatedAthleteSettings {
                valid_from: utc(2020, 1, 1),
                settings: settings_with_ftp(200.0),
            },
        ],
    }
}

/// Compute worker returning fixed stats, optionally failing every request
///
/// A slow one sleeps `delay` on the Tokio clock before answering.
#[derive(Default)]
pub struct ScriptedWorker {
    pub fail: bool,
    pub delay: Duration,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<ActivityComputeRequest>>,
}

impl ScriptedWorker {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Wait until the worker received `count` requests
    pub async fn wait_for_calls(&self, count: usize) {
        while self.call_count() < count {
            time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Stats every computed activity gets
    pub fn computed_stats() -> ActivityStats {
        ActivityStats {
            distance: Some(1000.0),
            elapsed_time: Some(3600.0),
            power: Some(PowerStats {
                avg: Some(150.0),
                max: Some(600.0),
                ..PowerStats::default()
            }),
            ..ActivityStats::default()
        }
    }
}

#[async_trait]
impl ComputeWorker for ScriptedWorker {
    async fn compute(
        &self,
        request: ActivityComputeRequest,
    ) -> Result<ActivityComputeResponse, ComputeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(ComputeError::Rejected {
                activity_id: request.activity.id().to_owned(),
                reason: "scripted failure".to_owned(),
            });
        }

        let deflated_streams = match (&request.streams, request.deflate_streams) {
            (Some(streams), true) => Some(streams.deflate().unwrap()),
            _ => None,
        };
        let mut computed = request.activity;
        computed.stats = Self::computed_stats();
        Ok(ActivityComputeResponse {
            computed_activity: computed,
            deflated_streams,
        })
    }
}

/// Connector emitting a GENERIC tick every 100ms until its run ends
///
/// A cooperative one honors stop requests; the other only notices when its
/// stream gets closed from outside.
pub struct TickingConnector {
    base: ConnectorBase,
    cooperative: bool,
}

impl TickingConnector {
    pub fn new(context: Arc<RuntimeContext>, cooperative: bool) -> Self {
        Self {
            base: ConnectorBase::new(
                ConnectorType::RemoteApi,
                context,
                Arc::new(InMemoryActivityStore::new()),
                Arc::new(ScriptedWorker::default()),
            ),
            cooperative,
        }
    }
}

#[async_trait]
impl Connector for TickingConnector {
    type Source = ();

    fn base(&self) -> &ConnectorBase {
        &self.base
    }

    fn sync(self: Arc<Self>) -> SyncEventStream {
        match self.base.begin_sync() {
            SyncStart::Rejected(stream) => stream,
            SyncStart::Run { stream, .. } => {
                let run_stream = stream.clone();
                tokio::spawn(async move {
                    loop {
                        if self.cooperative && self.base.is_stop_requested() {
                            self.base.finish(&run_stream, RunOutcome::Stopped);
                            return;
                        }
                        if run_stream.is_closed() {
                            return;
                        }
                        self.base.emit(
                            &run_stream,
                            SyncEvent::generic(ConnectorType::RemoteApi, "tick"),
                        );
                        time::sleep(Duration::from_millis(100)).await;
                    }
                });
                stream
            }
        }
    }

    fn get_source_stats(
        &self,
        _sport: &SportType,
        _source: &(),
        _streams: Option<&Streams>,
    ) -> ActivityStats {
        ActivityStats::default()
    }
}

/// Drain a stream until it closes
pub async fn collect_events(stream: &SyncEventStream) -> Vec<SyncEvent> {
    let mut subscription = stream.subscribe();
    let mut events = Vec::new();
    let drained = time::timeout(Duration::from_secs(30), async {
        while let Some(event) = subscription.next().await {
            events.push(event);
        }
    })
    .await;
    assert!(drained.is_ok(), "event stream did not close in time");
    events
}

/// Discriminants of `events`, in order
pub fn event_types(events: &[SyncEvent]) -> Vec<SyncEventType> {
    events.iter().map(SyncEvent::event_type).collect()
}

/// Payload of the single ERROR event of `events`
pub fn single_error(events: &[SyncEvent]) -> SyncErrorDetails {
    let errors: Vec<_> = events
        .iter()
        .filter_map(|event| match &event.payload {
            SyncEventPayload::Error(details) => Some(details.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(errors.len(), 1, "expected exactly one error in {events:?}");
    errors.into_iter().next().unwrap()
}

/// Native JSON export of a ride with one sample per second
pub fn ride_document(start: &str, seconds: usize) -> Value {
    let time: Vec<f64> = (0..seconds).map(|second| second as f64).collect();
    let watts: Vec<f64> = time.iter().map(|t| 180.0 + (t % 40.0)).collect();
    let heartrate: Vec<f64> = time.iter().map(|t| 130.0 + (t % 20.0)).collect();
    let distance: Vec<f64> = time.iter().map(|t| t * 8.0).collect();
    json!({
        "name": "Morning ride",
        "sport": "Ride",
        "start_time": start,
        "has_power_meter": true,
        "device": "Edge 530",
        "summary": {
            "total_distance": 12345.0,
            "total_elapsed_time": seconds as f64,
            "total_calories": 640.0
        },
        "streams": {
            "time": time,
            "distance": distance,
            "watts": watts,
            "heartrate": heartrate
        }
    })
}

/// Write a JSON activity document into `dir`
pub fn write_activity_file(dir: &Path, file_name: &str, document: &Value) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, serde_json::to_vec_pretty(document).unwrap()).unwrap();
    path
}
