// ABOUTME: Connector syncing activity files (.fit, .tcx, .gpx, .json) from a local directory
// ABOUTME: Scans with glob, filters by modification time, parses, computes and emits events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Activity file parsers
pub mod parser;

pub use parser::{
    ActivityFileParser, FileActivitySummary, FileParseError, JsonActivityFileParser,
    ParsedActivityFile, ParserRegistry,
};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use glob::{glob_with, MatchOptions, Pattern};
use pierre_core::errors::{ConnectorError, SyncErrorCode};
use pierre_core::models::{
    ActivityExtras, ActivityFileType, ActivityStats, CadenceStats, ConnectorType, ElevationStats,
    FileExtras, HeartRateStats, PowerStats, SportType, SpeedStats, Streams, SyncErrorDetails,
    SyncEvent,
};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use super::base::{
    record_error_details, spawn_run, ActiveConfig, ProcessedActivity, RunOutcome, SyncStart,
};
use super::{Connector, ConnectorBase, SourceActivity};
use crate::compute::ComputeWorker;
use crate::context::RuntimeContext;
use crate::debug_upload::ActivityInError;
use crate::events::SyncEventStream;
use crate::store::LocalActivityStore;

/// Extensions scanned for activity files
const SCANNED_FILE_TYPES: [ActivityFileType; 4] = [
    ActivityFileType::Fit,
    ActivityFileType::Tcx,
    ActivityFileType::Gpx,
    ActivityFileType::Json,
];

/// Where and how to read activity files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemSource {
    /// Directory holding the activity files
    pub source_directory: PathBuf,
    /// Also scan sub directories
    #[serde(default)]
    pub scan_sub_directories: bool,
    /// Delete each file once its activity is synced
    #[serde(default)]
    pub delete_activity_files_after_sync: bool,
}

impl FileSystemSource {
    /// Non-recursive source keeping files
    #[must_use]
    pub fn new(source_directory: impl Into<PathBuf>) -> Self {
        Self {
            source_directory: source_directory.into(),
            scan_sub_directories: false,
            delete_activity_files_after_sync: false,
        }
    }
}

/// Syncs activity files from a local directory
pub struct FileSystemConnector {
    base: ConnectorBase,
    source: FileSystemSource,
    parsers: ParserRegistry,
}

impl FileSystemConnector {
    /// Create a connector with the default parser registry
    #[must_use]
    pub fn new(
        context: Arc<RuntimeContext>,
        store: Arc<dyn LocalActivityStore>,
        worker: Arc<dyn ComputeWorker>,
        source: FileSystemSource,
    ) -> Self {
        Self {
            base: ConnectorBase::new(ConnectorType::FileSystem, context, store, worker),
            source,
            parsers: ParserRegistry::with_defaults(),
        }
    }

    /// Add a parser for another file format
    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn ActivityFileParser>) -> Self {
        self.parsers.register(parser);
        self
    }

    /// Source settings
    #[must_use]
    pub const fn source(&self) -> &FileSystemSource {
        &self.source
    }

    /// Activity files of the source directory, sorted by path
    ///
    /// Files modified before `modified_since` are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::InvalidConfig` if the directory path is not
    /// valid unicode
    pub async fn scan_activity_files(
        &self,
        modified_since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PathBuf>, ConnectorError> {
        let directory = self.source.source_directory.to_str().ok_or_else(|| {
            ConnectorError::invalid_config(format!(
                "source directory {} is not valid unicode",
                self.source.source_directory.display()
            ))
        })?;
        let prefix = Pattern::escape(directory.trim_end_matches(['/', '\\']));
        let depth = if self.source.scan_sub_directories {
            "**/"
        } else {
            ""
        };
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };

        let mut files = Vec::new();
        for file_type in SCANNED_FILE_TYPES {
            let pattern = format!("{prefix}/{depth}*.{}", file_type.extension());
            let entries = glob_with(&pattern, options).map_err(|err| {
                ConnectorError::invalid_config(format!("invalid scan pattern {pattern}: {err}"))
            })?;
            // Unreadable entries are skipped
            files.extend(entries.filter_map(Result::ok).filter(|path| path.is_file()));
        }
        files.sort();
        files.dedup();

        let Some(since) = modified_since else {
            return Ok(files);
        };
        let since: SystemTime = since.into();
        let mut recent = Vec::with_capacity(files.len());
        for path in files {
            let modified = fs::metadata(&path)
                .await
                .and_then(|metadata| metadata.modified());
            match modified {
                Ok(modified) if modified < since => {
                    debug!(path = %path.display(), "Skipping file modified before sync lower bound");
                }
                _ => recent.push(path),
            }
        }
        Ok(recent)
    }

    async fn run(&self, stream: &SyncEventStream, config: &ActiveConfig) -> RunOutcome {
        let directory = &self.source.source_directory;
        if !fs::metadata(directory)
            .await
            .is_ok_and(|metadata| metadata.is_dir())
        {
            return RunOutcome::Failed(SyncErrorDetails::new(
                SyncErrorCode::SourceDirectoryMissing,
                format!("source directory {} does not exist", directory.display()),
            ));
        }

        let files = match self.scan_activity_files(config.sync_from).await {
            Ok(files) => files,
            Err(err) => {
                return RunOutcome::Failed(SyncErrorDetails::new(
                    SyncErrorCode::UnhandledError,
                    err.to_string(),
                ))
            }
        };
        info!(
            connector = %ConnectorType::FileSystem,
            directory = %directory.display(),
            files = files.len(),
            "Activity files found"
        );
        self.base.emit(
            stream,
            SyncEvent::generic(
                ConnectorType::FileSystem,
                format!("{} activity files found", files.len()),
            ),
        );

        for path in files {
            if self.base.should_stop(stream) {
                return RunOutcome::Stopped;
            }
            self.sync_file(stream, config, &path).await;
        }

        if self.base.should_stop(stream) {
            RunOutcome::Stopped
        } else {
            RunOutcome::Completed
        }
    }

    async fn sync_file(&self, stream: &SyncEventStream, config: &ActiveConfig, path: &Path) {
        let file_name = path.display().to_string();
        let Some(file_type) = ActivityFileType::from_path(path) else {
            return;
        };
        let Some(parser) = self.parsers.get(file_type) else {
            debug!(path = %file_name, %file_type, "No parser registered for file type");
            self.base.emit_error(
                stream,
                SyncErrorDetails::new(
                    SyncErrorCode::ParseError,
                    format!("no parser available for .{file_type} files"),
                )
                .for_activity(&file_name),
            );
            return;
        };

        let parsed = match fs::read(path).await {
            Ok(content) => parser.parse(path, &content).map_err(|err| err.to_string()),
            Err(err) => Err(format!("cannot read file: {err}")),
        };
        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(reason) => {
                warn!(path = %file_name, %reason, "Activity file parsing failed");
                self.upload_in_error(path, file_type, "unknown", "parser", &reason, None);
                self.base.emit_error(
                    stream,
                    SyncErrorDetails::new(SyncErrorCode::ParseError, reason).for_activity(&file_name),
                );
                return;
            }
        };

        let source_stats =
            self.get_source_stats(&parsed.bare.sport, &parsed.summary, parsed.streams.as_ref());
        let sport = parsed.bare.sport.as_key();
        let record = SourceActivity {
            bare: parsed.bare,
            streams: parsed.streams,
            source_stats,
            laps: parsed.laps,
            device: parsed.device,
            extras: ActivityExtras {
                remote_activity_id: None,
                file: Some(FileExtras {
                    path: file_name.clone(),
                    file_type,
                }),
            },
        };

        if self.base.should_stop(stream) {
            debug!(path = %file_name, "Run stopping, activity file left unprocessed");
            return;
        }
        match self.base.process_activity(config, record).await {
            Ok(processed) => {
                let synced = matches!(processed, ProcessedActivity::New { .. });
                let delivered = self
                    .base
                    .try_emit(stream, processed.into_event(ConnectorType::FileSystem));
                // Files of activities the caller never received are kept
                if synced && delivered && self.source.delete_activity_files_after_sync {
                    if let Err(err) = fs::remove_file(path).await {
                        warn!(path = %file_name, error = %err, "Unable to delete synced activity file");
                    }
                }
            }
            Err(err) => {
                warn!(path = %file_name, error = %err, "Activity processing failed");
                if matches!(err, ConnectorError::Compute { .. }) {
                    self.upload_in_error(path, file_type, &sport, "compute", &err.to_string(), None);
                }
                self.base
                    .emit_error(stream, record_error_details(&err, &file_name));
            }
        }
    }

    fn upload_in_error(
        &self,
        path: &Path,
        file_type: ActivityFileType,
        sport: &str,
        source: &str,
        reason: &str,
        activity_id: Option<String>,
    ) {
        // Upload runs on its own task; the handle is not awaited
        let _upload = self.base.uploader().upload_activity_in_error(&ActivityInError {
            connector: ConnectorType::FileSystem,
            sport: sport.to_owned(),
            file_type: file_type.to_string(),
            source: source.to_owned(),
            reason: reason.to_owned(),
            path: path.to_path_buf(),
            activity_id,
        });
    }
}

#[async_trait]
impl Connector for FileSystemConnector {
    type Source = FileActivitySummary;

    fn base(&self) -> &ConnectorBase {
        &self.base
    }

    fn sync(self: Arc<Self>) -> SyncEventStream {
        match self.base.begin_sync() {
            SyncStart::Rejected(stream) => stream,
            SyncStart::Run { stream, config } => {
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
        _sport: &SportType,
        source: &FileActivitySummary,
        _streams: Option<&Streams>,
    ) -> ActivityStats {
        let moving_time = source.total_timer_time;
        let elapsed_time = source.total_elapsed_time;

        let mut stats = ActivityStats {
            distance: source.total_distance,
            elevation_gain: source.total_ascent,
            elapsed_time,
            moving_time,
            pause_time: elapsed_time
                .zip(moving_time)
                .map(|(elapsed, moving)| (elapsed - moving).max(0.0)),
            calories: source.total_calories,
            ..ActivityStats::default()
        };

        if source.avg_speed.is_some() || source.max_speed.is_some() {
            stats.speed = Some(SpeedStats {
                avg: source.avg_speed,
                max: source.max_speed,
                ..SpeedStats::default()
            });
        }
        if source.avg_heart_rate.is_some() || source.max_heart_rate.is_some() {
            stats.heart_rate = Some(HeartRateStats {
                avg: source.avg_heart_rate,
                max: source.max_heart_rate,
                ..HeartRateStats::default()
            });
        }
        if source.avg_power.is_some()
            || source.max_power.is_some()
            || source.normalized_power.is_some()
        {
            stats.power = Some(PowerStats {
                avg: source.avg_power,
                max: source.max_power,
                weighted: source.normalized_power,
                work: source.total_work.map(|joules| joules / 1000.0),
                ..PowerStats::default()
            });
        }
        if source.avg_cadence.is_some() || source.max_cadence.is_some() {
            stats.cadence = Some(CadenceStats {
                avg: source.avg_cadence,
                max: source.max_cadence,
                ..CadenceStats::default()
            });
        }
        if source.total_ascent.is_some() || source.total_descent.is_some() {
            stats.elevation = Some(ElevationStats {
                ascent: source.total_ascent,
                descent: source.total_descent,
                ..ElevationStats::default()
            });
        }
        stats
    }
}
