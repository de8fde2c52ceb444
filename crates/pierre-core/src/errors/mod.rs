// ABOUTME: Error taxonomy for connectors, the compute worker channel and the local store
// ABOUTME: Structured thiserror enums plus the error codes carried by ERROR sync events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Error Types
//!
//! - `ConnectorError` - lifecycle and orchestration failures returned to callers
//! - `ComputeError` - failures of the external compute worker
//! - `StoreError` - failures of local activity store reads
//! - `StreamsCodecError` - deflate/inflate failures
//! - `SyncErrorCode` - codes reported inside ERROR sync events

mod sync;

pub use sync::SyncErrorCode;

use std::io;

use crate::models::ConnectorType;

/// Errors returned by connector operations
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// `stop()` was called while no sync is running
    #[error("{connector} connector is not syncing currently")]
    NotSyncing {
        /// Connector kind
        connector: ConnectorType,
    },

    /// A stop wait is already pending on this connector
    #[error("{connector} connector already has a stop request pending")]
    StopAlreadyPending {
        /// Connector kind
        connector: ConnectorType,
    },

    /// The connector must be configured before syncing
    #[error("{connector} connector is not configured")]
    NotConfigured {
        /// Connector kind
        connector: ConnectorType,
    },

    /// Configuration cannot be replaced while syncing
    #[error("{connector} connector is syncing, configuration cannot change")]
    SyncInProgress {
        /// Connector kind
        connector: ConnectorType,
    },

    /// Configuration rejected
    #[error("Invalid connector configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected
        reason: String,
    },

    /// The athlete profile history holds no entry
    #[error("Athlete profile history is empty")]
    EmptyAthleteHistory,

    /// Local store read failed
    #[error("Local store error")]
    Store {
        /// Underlying store error
        #[from]
        source: StoreError,
    },

    /// Compute worker failed
    #[error("Compute worker error")]
    Compute {
        /// Underlying compute error
        #[from]
        source: ComputeError,
    },

    /// Streams could not be encoded or decoded
    #[error("Streams codec error")]
    Streams {
        /// Underlying codec error
        #[from]
        source: StreamsCodecError,
    },

    /// Serialization error
    #[error("Serialization failed for {context}")]
    Serialization {
        /// Context where serialization failed
        context: &'static str,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// I/O error
    #[error("I/O error on {path}")]
    Io {
        /// Path involved
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ConnectorError {
    /// Create an "invalid config" error
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an I/O error bound to a path
    #[must_use]
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Errors of the compute worker channel
#[derive(Debug, Clone, thiserror::Error)]
pub enum ComputeError {
    /// The worker rejected the request
    #[error("Compute worker rejected activity {activity_id}: {reason}")]
    Rejected {
        /// Activity being computed
        activity_id: String,
        /// Worker reason
        reason: String,
    },

    /// The worker could not be reached or crashed
    #[error("Compute worker unavailable: {reason}")]
    Unavailable {
        /// Why the worker is unavailable
        reason: String,
    },
}

/// Errors of local activity store reads
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The store backend failed
    #[error("Store backend failure: {reason}")]
    Backend {
        /// Backend reason
        reason: String,
    },

    /// The store returned streams that cannot be inflated
    #[error("Corrupted streams for activity {activity_id}: {reason}")]
    CorruptedStreams {
        /// Activity whose streams are corrupted
        activity_id: String,
        /// Decoding failure
        reason: String,
    },
}

/// Errors of the streams deflate/inflate codec
#[derive(Debug, thiserror::Error)]
pub enum StreamsCodecError {
    /// JSON (de)serialization failed
    #[error("Streams JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Compression stream failed
    #[error("Streams compression error: {0}")]
    Compression(#[from] io::Error),

    /// Base64 payload is malformed
    #[error("Streams encoding error: {0}")]
    Encoding(#[from] base64::DecodeError),
}
