// ABOUTME: Error codes reported by ERROR sync events
// ABOUTME: Stable serialized names with human descriptions for the presentation layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error codes carried by ERROR sync events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncErrorCode {
    /// Unexpected failure during the run
    #[serde(rename = "UNHANDLED_ERROR_SYNC")]
    UnhandledError,
    /// `sync()` called while a run is already in progress
    #[serde(rename = "SYNC_ALREADY_STARTED")]
    SyncAlreadyStarted,
    /// Several local activities match one synced record
    #[serde(rename = "MULTIPLE_ACTIVITIES_FOUND")]
    MultipleActivitiesFound,
    /// File-system source directory is missing
    #[serde(rename = "FS_SOURCE_DIRECTORY_DONT_EXISTS")]
    SourceDirectoryMissing,
    /// An activity file could not be parsed
    #[serde(rename = "FS_PARSE_ERROR")]
    ParseError,
    /// The compute worker failed for a record
    #[serde(rename = "COMPUTE_FAILED")]
    ComputeFailed,
    /// Remote source refused the credentials
    #[serde(rename = "REMOTE_UNAUTHORIZED")]
    RemoteUnauthorized,
    /// Remote source failed
    #[serde(rename = "REMOTE_SOURCE_ERROR")]
    RemoteSourceError,
    /// Streams of a record could not be fetched
    #[serde(rename = "STREAMS_UNAVAILABLE")]
    StreamsUnavailable,
}

impl SyncErrorCode {
    /// Get a user-friendly description of this error code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnhandledError => "An unexpected error occurred during sync",
            Self::SyncAlreadyStarted => "A sync is already running on this connector",
            Self::MultipleActivitiesFound => "Several local activities match this activity",
            Self::SourceDirectoryMissing => "The source directory does not exist",
            Self::ParseError => "The activity file could not be parsed",
            Self::ComputeFailed => "Activity statistics could not be computed",
            Self::RemoteUnauthorized => "The remote source refused the credentials",
            Self::RemoteSourceError => "The remote source failed",
            Self::StreamsUnavailable => "Activity streams could not be fetched",
        }
    }
}

impl fmt::Display for SyncErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
