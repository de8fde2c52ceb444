// ABOUTME: Main library entry point for Pierre activity sync
// ABOUTME: Connectors that turn local files or remote listings into computed activities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Activity Sync
//!
//! Pulls fitness activities from heterogeneous sources and turns them into
//! canonical, fully computed activities, reporting progress as a stream of
//! sync events.
//!
//! ## Architecture
//!
//! - **Connectors**: one per source kind (local directory, remote API), all
//!   sharing the lifecycle held by [`connectors::ConnectorBase`]
//! - **Events**: replayable per-run event streams with cooperative stop
//! - **Resolvers**: dated athlete settings resolved per activity start time
//! - **Compute**: stats pipeline delegating to a pluggable compute worker
//! - **Debug upload**: optional reporting of problematic source files
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pierre_activity_sync::compute::LocalComputeWorker;
//! use pierre_activity_sync::config::SyncEnvironment;
//! use pierre_activity_sync::connectors::{
//!     Connector, ConnectorConfig, FileSystemConnector, FileSystemSource,
//! };
//! use pierre_activity_sync::context::RuntimeContext;
//! use pierre_activity_sync::store::InMemoryActivityStore;
//! use pierre_core::models::{AthleteProfileHistory, AthleteSettings, ConnectorType, Gender};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let context = Arc::new(RuntimeContext::detect(SyncEnvironment::from_env()?));
//!     let connector = Arc::new(FileSystemConnector::new(
//!         context,
//!         Arc::new(InMemoryActivityStore::new()),
//!         Arc::new(LocalComputeWorker::new()),
//!         FileSystemSource::new("/data/activities"),
//!     ));
//!
//!     let profile = AthleteProfileHistory::single(
//!         Gender::Men,
//!         chrono::Utc::now(),
//!         AthleteSettings::default(),
//!     );
//!     connector.configure(ConnectorConfig::new(ConnectorType::FileSystem, profile))?;
//!
//!     let mut events = Arc::clone(&connector).sync().subscribe();
//!     while let Some(event) = events.next().await {
//!         println!("{}", event.event_type());
//!     }
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Structured logging setup
pub mod logging;

/// Runtime facts and shared HTTP client
pub mod context;

/// Athlete snapshot resolution
pub mod resolvers;

/// Activity identifiers and content hashes
pub mod identity;

/// Debug collector uploads of problematic files
pub mod debug_upload;

/// Replayable sync event streams
pub mod events;

/// Cooperative stop handling
pub mod stop;

/// Stats computation pipeline and workers
pub mod compute;

/// Local activity store abstraction
pub mod store;

/// Source connectors
pub mod connectors;
