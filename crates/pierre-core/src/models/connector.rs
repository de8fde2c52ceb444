// ABOUTME: Connector kinds and activity file types shared by connectors and events
// ABOUTME: Lower-case sub paths identify the connector kind in debug upload URLs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Kind of source a connector syncs from
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectorType {
    /// Local directory of activity files
    FileSystem,
    /// Remote activity API
    RemoteApi,
}

impl ConnectorType {
    /// Lower-case kind used to build debug collector paths
    #[must_use]
    pub const fn sub_path(self) -> &'static str {
        match self {
            Self::FileSystem => "file_system",
            Self::RemoteApi => "remote_api",
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileSystem => write!(f, "FILE_SYSTEM"),
            Self::RemoteApi => write!(f, "REMOTE_API"),
        }
    }
}

/// Format of an activity file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityFileType {
    /// Garmin/ANT+ FIT binary file
    Fit,
    /// Garmin Training Center XML
    Tcx,
    /// GPS exchange format
    Gpx,
    /// Native JSON export
    Json,
}

impl ActivityFileType {
    /// Detect the file type from a path extension (case-insensitive)
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "fit" => Some(Self::Fit),
            "tcx" => Some(Self::Tcx),
            "gpx" => Some(Self::Gpx),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// File extension without the leading dot
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::Tcx => "tcx",
            Self::Gpx => "gpx",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ActivityFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
