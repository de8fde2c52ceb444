// ABOUTME: Activity file parsers keyed by file type, with the native JSON export parser
// ABOUTME: FIT, TCX and GPX decoders plug in through the same trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use pierre_core::models::{ActivityFileType, BareActivity, Lap, SportType, Streams};
use serde::{Deserialize, Serialize};

/// Summary fields recorded in an activity file
///
/// Names follow the FIT session message; all values are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileActivitySummary {
    /// Distance (m)
    pub total_distance: Option<f64>,
    /// Elapsed time (s)
    pub total_elapsed_time: Option<f64>,
    /// Timer (moving) time (s)
    pub total_timer_time: Option<f64>,
    /// Ascent (m)
    pub total_ascent: Option<f64>,
    /// Descent (m)
    pub total_descent: Option<f64>,
    /// Average speed (m/s)
    pub avg_speed: Option<f64>,
    /// Maximum speed (m/s)
    pub max_speed: Option<f64>,
    /// Average heart rate (bpm)
    pub avg_heart_rate: Option<f64>,
    /// Maximum heart rate (bpm)
    pub max_heart_rate: Option<f64>,
    /// Average power (watts)
    pub avg_power: Option<f64>,
    /// Maximum power (watts)
    pub max_power: Option<f64>,
    /// Normalized power (watts)
    pub normalized_power: Option<f64>,
    /// Average cadence
    pub avg_cadence: Option<f64>,
    /// Maximum cadence
    pub max_cadence: Option<f64>,
    /// Calories (kcal)
    pub total_calories: Option<f64>,
    /// Work (J)
    pub total_work: Option<f64>,
}

/// Content extracted from an activity file
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedActivityFile {
    /// Recorded facts
    pub bare: BareActivity,
    /// Summary fields as recorded
    pub summary: FileActivitySummary,
    /// Recorded streams, if any
    pub streams: Option<Streams>,
    /// Laps
    pub laps: Vec<Lap>,
    /// Recording device
    pub device: Option<String>,
}

/// Activity file parsing failures
#[derive(Debug, thiserror::Error)]
pub enum FileParseError {
    /// The file content is malformed
    #[error("malformed {file_type} file: {reason}")]
    Malformed {
        /// File format
        file_type: ActivityFileType,
        /// What is wrong
        reason: String,
    },

    /// A required value is missing
    #[error("missing {field} in {file_type} file")]
    MissingField {
        /// File format
        file_type: ActivityFileType,
        /// Missing value
        field: &'static str,
    },
}

/// Decoder of one activity file format
pub trait ActivityFileParser: Send + Sync {
    /// Format handled by this parser
    fn file_type(&self) -> ActivityFileType;

    /// Parse the file content read from `path`
    ///
    /// # Errors
    ///
    /// Returns `FileParseError` if the content cannot be decoded
    fn parse(&self, path: &Path, content: &[u8]) -> Result<ParsedActivityFile, FileParseError>;
}

/// Parsers indexed by file type
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<ActivityFileType, Arc<dyn ActivityFileParser>>,
}

impl ParserRegistry {
    /// Registry with the built-in JSON parser
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(JsonActivityFileParser));
        registry
    }

    /// Add or replace the parser of its file type
    pub fn register(&mut self, parser: Arc<dyn ActivityFileParser>) {
        self.parsers.insert(parser.file_type(), parser);
    }

    /// Parser for `file_type`
    #[must_use]
    pub fn get(&self, file_type: ActivityFileType) -> Option<&Arc<dyn ActivityFileParser>> {
        self.parsers.get(&file_type)
    }

    /// Tell whether a parser handles `file_type`
    #[must_use]
    pub fn supports(&self, file_type: ActivityFileType) -> bool {
        self.parsers.contains_key(&file_type)
    }
}

#[derive(Debug, Deserialize)]
struct JsonActivityDocument {
    #[serde(default)]
    name: Option<String>,
    sport: String,
    start_time: DateTime<Utc>,
    #[serde(default)]
    end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    has_power_meter: bool,
    #[serde(default)]
    trainer: bool,
    #[serde(default)]
    commute: bool,
    #[serde(default)]
    device: Option<String>,
    #[serde(default)]
    summary: FileActivitySummary,
    #[serde(default)]
    streams: Option<Streams>,
    #[serde(default)]
    laps: Vec<Lap>,
}

/// Parser of the native JSON activity export
///
/// The end time falls back to the last time sample, then to the summary
/// elapsed time.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonActivityFileParser;

impl ActivityFileParser for JsonActivityFileParser {
    fn file_type(&self) -> ActivityFileType {
        ActivityFileType::Json
    }

    fn parse(&self, _path: &Path, content: &[u8]) -> Result<ParsedActivityFile, FileParseError> {
        let document: JsonActivityDocument =
            serde_json::from_slice(content).map_err(|err| FileParseError::Malformed {
                file_type: ActivityFileType::Json,
                reason: err.to_string(),
            })?;

        let elapsed_seconds = document
            .streams
            .as_ref()
            .and_then(|streams| streams.time.last().copied())
            .or(document.summary.total_elapsed_time);
        let end_time = document
            .end_time
            .or_else(|| {
                elapsed_seconds.map(|seconds| {
                    document.start_time + Duration::milliseconds((seconds * 1000.0) as i64)
                })
            })
            .ok_or(FileParseError::MissingField {
                file_type: ActivityFileType::Json,
                field: "end_time",
            })?;
        if end_time < document.start_time {
            return Err(FileParseError::Malformed {
                file_type: ActivityFileType::Json,
                reason: "end_time precedes start_time".to_owned(),
            });
        }

        let sport = SportType::from_provider_string(&document.sport);
        let name = document
            .name
            .unwrap_or_else(|| format!("{} activity", sport.display_name()));

        Ok(ParsedActivityFile {
            bare: BareActivity {
                id: String::new(),
                name,
                sport,
                start_time: document.start_time,
                end_time,
                has_power_meter: document.has_power_meter,
                trainer: document.trainer,
                commute: document.commute,
                manual: false,
            },
            summary: document.summary,
            streams: document.streams,
            laps: document.laps,
            device: document.device,
        })
    }
}
