// ABOUTME: Activity stats pipeline delegating computation to an isolated compute worker
// ABOUTME: Shapes worker requests and overlays source-reported stats on computed ones
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Activity stats pipeline
//!
//! The pipeline never computes statistics itself. It packages an activity,
//! its athlete snapshot, user settings and streams into an
//! [`ActivityComputeRequest`], hands it to a [`ComputeWorker`] and unpacks
//! the response. Worker failures are returned as-is; retries belong to the
//! worker dispatch layer.

/// In-process compute worker
pub mod local;
/// Stream statistics used by the local worker
pub mod stats;

pub use local::LocalComputeWorker;

use std::sync::Arc;

use async_trait::async_trait;
use pierre_core::errors::{ComputeError, ConnectorError, ConnectorResult};
use pierre_core::models::{Activity, ActivityStats, AthleteSnapshot, Streams, UserSettings};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Request sent to a compute worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityComputeRequest {
    /// Activity to compute
    pub activity: Activity,
    /// Athlete profile in force for the activity
    pub athlete_snapshot: AthleteSnapshot,
    /// User settings
    pub user_settings: UserSettings,
    /// Recorded streams, if any
    pub streams: Option<Streams>,
    /// Return the streams deflated along with the computed activity
    pub deflate_streams: bool,
    /// Compute best-window peaks
    pub return_peaks: bool,
    /// Compute time in zones
    pub return_zones: bool,
    /// Restrict computation to the `[start, end]` sample indexes
    pub bounds: Option<[usize; 2]>,
    /// Requesting athlete owns the activity
    pub is_owner: bool,
}

/// Response of a compute worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityComputeResponse {
    /// Activity with `stats` filled
    pub computed_activity: Activity,
    /// Deflated streams when requested and available
    pub deflated_streams: Option<String>,
}

/// Isolated unit turning an activity and its streams into statistics
#[async_trait]
pub trait ComputeWorker: Send + Sync {
    /// Compute the activity described by `request`
    async fn compute(
        &self,
        request: ActivityComputeRequest,
    ) -> Result<ActivityComputeResponse, ComputeError>;
}

/// Request shaping and response unpacking around a [`ComputeWorker`]
#[derive(Clone)]
pub struct ActivityStatsPipeline {
    worker: Arc<dyn ComputeWorker>,
}

impl ActivityStatsPipeline {
    /// Create a pipeline dispatching to `worker`
    #[must_use]
    pub fn new(worker: Arc<dyn ComputeWorker>) -> Self {
        Self { worker }
    }

    /// Compute an activity on the worker
    ///
    /// Peaks are always requested, zones never, bounds cover the whole
    /// activity and the athlete is the owner.
    ///
    /// # Errors
    ///
    /// Returns the worker error unchanged
    pub async fn compute_activity(
        &self,
        activity: Activity,
        athlete_snapshot: AthleteSnapshot,
        user_settings: UserSettings,
        streams: Option<Streams>,
        deflate_streams: bool,
    ) -> Result<ActivityComputeResponse, ComputeError> {
        debug!(activity_id = %activity.id(), deflate_streams, "Dispatching activity to compute worker");
        let request = ActivityComputeRequest {
            activity,
            athlete_snapshot,
            user_settings,
            streams,
            deflate_streams,
            return_peaks: true,
            return_zones: false,
            bounds: None,
            is_owner: true,
        };
        self.worker.compute(request).await
    }

    /// Record source stats and overlay them on the computed `stats`
    ///
    /// Sets `activity.src_stats` to `source_stats` and `activity.stats` to a
    /// deep merge of a copy of `stats` with `source_stats`: every field the
    /// source reports wins, every other field keeps its computed value.
    /// `stats` itself is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Serialization` if the stats trees cannot be merged
    pub fn apply_source_stats(
        activity: &mut Activity,
        source_stats: ActivityStats,
        stats: &ActivityStats,
    ) -> ConnectorResult<()> {
        let merged = stats
            .overlaid_with(&source_stats)
            .map_err(|source| ConnectorError::Serialization {
                context: "source stats overlay",
                source,
            })?;
        activity.src_stats = Some(source_stats);
        activity.stats = merged;
        Ok(())
    }
}
