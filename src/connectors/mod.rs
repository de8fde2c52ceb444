// ABOUTME: Connector contract and the concrete file system and remote API connectors
// ABOUTME: Shared lifecycle lives in ConnectorBase; connectors implement source iteration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Connectors
//!
//! A connector syncs activities from one kind of source. Callers run
//! `configure()` then `sync()` and observe the returned [`SyncEventStream`].
//! `stop()` asks the running sync to halt and resolves once it did, or once
//! a STOPPED event was forced after the stop wait bound.
//!
//! Concrete connectors compose a [`ConnectorBase`] rather than inheriting
//! behavior: stop handling, identity, snapshot resolution and stats merging
//! all live there.

/// Shared connector state and helpers
pub mod base;
/// Connector configuration
pub mod config;
/// Local directory connector
pub mod file_system;
/// Remote activity API connector
pub mod remote;

pub use base::{
    record_error_details, ActiveConfig, ConnectorBase, ProcessedActivity, RunOutcome,
    SourceActivity, SyncStart,
};
pub use config::ConnectorConfig;
pub use file_system::{FileSystemConnector, FileSystemSource};
pub use remote::{RemoteActivity, RemoteActivitySource, RemoteApiConnector, RemoteSourceError};

use std::sync::Arc;

use async_trait::async_trait;
use pierre_core::errors::ConnectorResult;
use pierre_core::models::{ActivityStats, ConnectorType, SportType, Streams};

use crate::events::SyncEventStream;

/// Contract every connector implements
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Source-native summary of an activity
    type Source: Send + Sync;

    /// Shared state of the connector
    fn base(&self) -> &ConnectorBase;

    /// Connector kind
    fn connector_type(&self) -> ConnectorType {
        self.base().connector_type()
    }

    /// Validate and store configuration, resetting runtime flags
    ///
    /// # Errors
    ///
    /// See [`ConnectorBase::configure`]
    fn configure(&self, config: ConnectorConfig) -> ConnectorResult<()> {
        self.base().configure(config)
    }

    /// Tell whether a sync is running
    fn is_syncing(&self) -> bool {
        self.base().is_syncing()
    }

    /// Start syncing and return the event stream of the run
    ///
    /// The run executes on a spawned task, so this must be called from
    /// within a Tokio runtime. While a run is in progress the returned
    /// stream is a new, closed one carrying a `SYNC_ALREADY_STARTED` error.
    fn sync(self: Arc<Self>) -> SyncEventStream;

    /// Map source-native summary fields to a partial stats overlay
    ///
    /// Pure: only reported fields are set.
    fn get_source_stats(
        &self,
        sport: &SportType,
        source: &Self::Source,
        streams: Option<&Streams>,
    ) -> ActivityStats;

    /// Ask the running sync to stop
    ///
    /// # Errors
    ///
    /// Fails when no sync is running or a stop is already pending
    async fn stop(&self) -> ConnectorResult<()> {
        self.base().stop().await
    }
}
