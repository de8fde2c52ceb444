// ABOUTME: Sync lifecycle events emitted by connectors (started, activity, error, stopped, complete)
// ABOUTME: Each event carries the originating connector kind and an immutable payload
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Activity, ConnectorType};
use crate::errors::SyncErrorCode;

/// Discriminant of a [`SyncEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncEventType {
    /// Free-form progress message
    Generic,
    /// Sync run started
    Started,
    /// Sync run stopped on request
    Stopped,
    /// An activity was synced
    Activity,
    /// A record or the source failed
    Error,
    /// Sync run completed
    Complete,
}

impl fmt::Display for SyncEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Generic => "GENERIC",
            Self::Started => "STARTED",
            Self::Stopped => "STOPPED",
            Self::Activity => "ACTIVITY",
            Self::Error => "ERROR",
            Self::Complete => "COMPLETE",
        };
        f.write_str(label)
    }
}

/// Details of an ERROR event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncErrorDetails {
    /// Error code
    pub code: SyncErrorCode,
    /// Human-readable description
    pub description: String,
    /// The run cannot continue after this error
    pub fatal: bool,
    /// Name of the activity or file the error relates to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_name: Option<String>,
}

impl SyncErrorDetails {
    /// Non-fatal error with `code` and `description`
    #[must_use]
    pub fn new(code: SyncErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            fatal: false,
            activity_name: None,
        }
    }

    /// Mark the error as ending the run
    #[must_use]
    pub const fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    /// Attach the name of the activity or file concerned
    #[must_use]
    pub fn for_activity(mut self, activity_name: impl Into<String>) -> Self {
        self.activity_name = Some(activity_name.into());
        self
    }
}

/// Payload of a sync event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncEventPayload {
    /// Free-form progress message
    Generic {
        /// Message
        description: String,
    },
    /// Sync run started
    Started,
    /// Sync run stopped on request
    Stopped,
    /// An activity was synced
    Activity {
        /// The synced activity
        activity: Box<Activity>,
        /// Activity does not exist locally yet
        is_new: bool,
        /// Deflated streams of a new activity
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deflated_streams: Option<String>,
    },
    /// A record or the source failed
    Error(SyncErrorDetails),
    /// Sync run completed
    Complete,
}

/// An event of a sync run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEvent {
    /// Connector that emitted the event
    pub connector: ConnectorType,
    /// Event payload
    #[serde(flatten)]
    pub payload: SyncEventPayload,
}

impl SyncEvent {
    /// Generic progress event
    #[must_use]
    pub fn generic(connector: ConnectorType, description: impl Into<String>) -> Self {
        Self {
            connector,
            payload: SyncEventPayload::Generic {
                description: description.into(),
            },
        }
    }

    /// Started event
    #[must_use]
    pub const fn started(connector: ConnectorType) -> Self {
        Self {
            connector,
            payload: SyncEventPayload::Started,
        }
    }

    /// Stopped event
    #[must_use]
    pub const fn stopped(connector: ConnectorType) -> Self {
        Self {
            connector,
            payload: SyncEventPayload::Stopped,
        }
    }

    /// Complete event
    #[must_use]
    pub const fn complete(connector: ConnectorType) -> Self {
        Self {
            connector,
            payload: SyncEventPayload::Complete,
        }
    }

    /// Activity event
    #[must_use]
    pub fn activity(
        connector: ConnectorType,
        activity: Activity,
        is_new: bool,
        deflated_streams: Option<String>,
    ) -> Self {
        Self {
            connector,
            payload: SyncEventPayload::Activity {
                activity: Box::new(activity),
                is_new,
                deflated_streams,
            },
        }
    }

    /// Error event
    #[must_use]
    pub fn error(connector: ConnectorType, details: SyncErrorDetails) -> Self {
        Self {
            connector,
            payload: SyncEventPayload::Error(details),
        }
    }

    /// Event discriminant
    #[must_use]
    pub const fn event_type(&self) -> SyncEventType {
        match self.payload {
            SyncEventPayload::Generic { .. } => SyncEventType::Generic,
            SyncEventPayload::Started => SyncEventType::Started,
            SyncEventPayload::Stopped => SyncEventType::Stopped,
            SyncEventPayload::Activity { .. } => SyncEventType::Activity,
            SyncEventPayload::Error(_) => SyncEventType::Error,
            SyncEventPayload::Complete => SyncEventType::Complete,
        }
    }

    /// Tell whether no further event follows this one in a run
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        match &self.payload {
            SyncEventPayload::Stopped | SyncEventPayload::Complete => true,
            SyncEventPayload::Error(details) => details.fatal,
            _ => false,
        }
    }
}
