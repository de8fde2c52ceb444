// ABOUTME: Command-line driver running a connector sync and printing events as JSON lines
// ABOUTME: Ctrl-C requests a cooperative stop of the running sync
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Sync every activity file of a directory tree
//! pierre-sync file-system --dir ~/activities --recursive --profile athlete.json
//!
//! # Only files modified since a date, deleting them once synced
//! pierre-sync file-system --dir ~/activities --since 2024-01-01T00:00:00Z \
//!     --profile athlete.json --delete-after-sync
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use pierre_activity_sync::compute::LocalComputeWorker;
use pierre_activity_sync::config::SyncEnvironment;
use pierre_activity_sync::connectors::{
    Connector, ConnectorConfig, FileSystemConnector, FileSystemSource,
};
use pierre_activity_sync::context::RuntimeContext;
use pierre_activity_sync::logging;
use pierre_activity_sync::store::InMemoryActivityStore;
use pierre_core::models::{
    AthleteProfileHistory, ConnectorType, DeflatedActivityStreams, SyncEvent, SyncEventPayload,
};
use tokio::{fs, signal};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "pierre-sync",
    about = "Pierre activity sync",
    long_about = "Sync fitness activities from a source and print sync events as JSON lines."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Sync activity files from a local directory
    FileSystem {
        /// Directory holding the activity files
        #[arg(long)]
        dir: PathBuf,

        /// Also scan sub directories
        #[arg(long)]
        recursive: bool,

        /// Only sync files modified at or after this RFC 3339 instant
        #[arg(long)]
        since: Option<DateTime<Utc>>,

        /// JSON athlete profile history
        #[arg(long)]
        profile: PathBuf,

        /// Delete each file once its activity is synced
        #[arg(long)]
        delete_after_sync: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_from_env()?;

    let environment = SyncEnvironment::from_env()?;
    let context = Arc::new(RuntimeContext::detect(environment));
    info!(runtime = %context.info().summary(), "Pierre activity sync");

    match cli.command {
        Command::FileSystem {
            dir,
            recursive,
            since,
            profile,
            delete_after_sync,
        } => {
            let store = Arc::new(InMemoryActivityStore::new());
            let source = FileSystemSource {
                source_directory: dir,
                scan_sub_directories: recursive,
                delete_activity_files_after_sync: delete_after_sync,
            };
            let connector = Arc::new(FileSystemConnector::new(
                context,
                Arc::clone(&store) as _,
                Arc::new(LocalComputeWorker::new()),
                source,
            ));

            let mut config = ConnectorConfig::new(
                ConnectorType::FileSystem,
                load_profile(&profile).await?,
            );
            if let Some(since) = since {
                config = config.with_sync_from(since);
            }
            connector.configure(config)?;

            run_sync(connector, &store).await
        }
    }
}

async fn load_profile(path: &Path) -> Result<AthleteProfileHistory> {
    let raw = fs::read(path)
        .await
        .with_context(|| format!("Failed to read athlete profile {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("Invalid athlete profile {}", path.display()))
}

async fn run_sync<C: Connector>(connector: Arc<C>, store: &InMemoryActivityStore) -> Result<()> {
    let mut events = Arc::clone(&connector).sync().subscribe();
    let mut stop_requested = false;

    loop {
        tokio::select! {
            event = events.next() => {
                let Some(event) = event else { break };
                record_event(store, &event);
                println!("{}", serde_json::to_string(&event)?);
            }
            interrupted = signal::ctrl_c(), if !stop_requested => {
                interrupted.context("Failed to listen for ctrl-c")?;
                stop_requested = true;
                info!("Stop requested");
                if let Err(err) = connector.stop().await {
                    warn!(error = %err, "Stop failed");
                }
            }
        }
    }

    info!(activities = store.len(), "Sync finished");
    Ok(())
}

fn record_event(store: &InMemoryActivityStore, event: &SyncEvent) {
    if let SyncEventPayload::Activity {
        activity,
        is_new: true,
        deflated_streams,
    } = &event.payload
    {
        if let Some(deflated_streams) = deflated_streams {
            store.upsert_streams(DeflatedActivityStreams {
                activity_id: activity.id().to_owned(),
                deflated_streams: deflated_streams.clone(),
            });
        }
        store.upsert_activity(activity.as_ref().clone());
    }
}
