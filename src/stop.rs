// ABOUTME: Sync run state and cooperative cancellation with a bounded stop wait
// ABOUTME: Forces a STOPPED event when the connector does not stop in time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Stop controller
//!
//! Owns the runtime flags of a connector (`is_syncing`, `stop_requested`)
//! and the event stream of the current run. Only the connector mutates
//! them; callers observe them through getters and `stop()`.
//!
//! `stop()` races the STOPPED event of the current run against a deadline.
//! When the deadline wins, a STOPPED event is synthesized so cancellation
//! is always delivered to the caller. The synthesized event closes the
//! run's stream, and a closed stream is the run's own signal to stop: the
//! flags may already belong to a newer run by then.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use pierre_core::errors::{ConnectorError, ConnectorResult};
use pierre_core::models::{ConnectorType, SyncEvent, SyncEventType};
use tokio::time;
use tracing::{debug, info, warn};

use crate::events::SyncEventStream;

/// Runtime state and stop handling of one connector instance
#[derive(Debug)]
pub struct StopController {
    connector: ConnectorType,
    timeout: Duration,
    is_syncing: AtomicBool,
    stop_requested: AtomicBool,
    stop_wait_active: AtomicBool,
    current: Mutex<SyncEventStream>,
}

/// Clears the single stop wait slot even if `stop()` is dropped mid-wait
struct StopWaitSlot<'a>(&'a AtomicBool);

impl Drop for StopWaitSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl StopController {
    /// Create an idle controller
    #[must_use]
    pub fn new(connector: ConnectorType, timeout: Duration) -> Self {
        Self {
            connector,
            timeout,
            is_syncing: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            stop_wait_active: AtomicBool::new(false),
            current: Mutex::new(SyncEventStream::closed_with(Vec::new())),
        }
    }

    /// Bound on the STOPPED wait
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Tell whether a sync run is in progress
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.is_syncing.load(Ordering::SeqCst)
    }

    /// Tell whether the current run was asked to stop
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Tell whether the run owning `stream` must stop processing records
    ///
    /// True once a stop was requested, and for good once the stream is
    /// closed, whatever happens to the flags afterwards.
    #[must_use]
    pub fn should_stop(&self, stream: &SyncEventStream) -> bool {
        stream.is_closed() || self.is_stop_requested()
    }

    /// Event stream of the current (or last) run
    #[must_use]
    pub fn current_stream(&self) -> SyncEventStream {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reset both flags; used by `configure()` on an idle connector
    pub fn reset(&self) {
        self.is_syncing.store(false, Ordering::SeqCst);
        self.stop_requested.store(false, Ordering::SeqCst);
    }

    /// Start a run with a fresh stream, or `None` if one is already running
    pub fn begin_run(&self) -> Option<SyncEventStream> {
        if self
            .is_syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }
        self.stop_requested.store(false, Ordering::SeqCst);

        let stream = SyncEventStream::new();
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = stream.clone();
        Some(stream)
    }

    /// End the run owning `stream` with a terminal event
    ///
    /// Clears `is_syncing` before publishing the event, so a caller woken by
    /// it already sees the connector idle. A stale run (whose stream was
    /// replaced) leaves the state untouched.
    pub fn finish_run(&self, stream: &SyncEventStream, terminal: SyncEvent) {
        {
            let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            if current.same_stream(stream) {
                self.is_syncing.store(false, Ordering::SeqCst);
            }
        }
        if !stream.push_and_close(terminal) {
            debug!(connector = %self.connector, "Run already closed, terminal event dropped");
        }
    }

    /// Ask the current run to stop and wait for it
    ///
    /// # Errors
    ///
    /// - `ConnectorError::NotSyncing` if no run is in progress (no event is emitted)
    /// - `ConnectorError::StopAlreadyPending` if another stop wait is active
    pub async fn stop(&self) -> ConnectorResult<()> {
        if !self.is_syncing() {
            return Err(ConnectorError::NotSyncing {
                connector: self.connector,
            });
        }
        if self.stop_wait_active.swap(true, Ordering::SeqCst) {
            return Err(ConnectorError::StopAlreadyPending {
                connector: self.connector,
            });
        }
        let _slot = StopWaitSlot(&self.stop_wait_active);

        self.stop_requested.store(true, Ordering::SeqCst);
        info!(connector = %self.connector, "Stop requested");

        let stream = self.current_stream();
        let mut subscription = stream.subscribe();
        let wait_stopped = async {
            while let Some(event) = subscription.next().await {
                if event.event_type() == SyncEventType::Stopped {
                    return true;
                }
            }
            false
        };

        tokio::select! {
            stopped = wait_stopped => {
                debug!(connector = %self.connector, stopped, "Run ended after stop request");
            }
            () = time::sleep(self.timeout) => {
                warn!(
                    connector = %self.connector,
                    timeout_ms = self.timeout.as_millis(),
                    "Request timed out after waiting for stop event from connector, emulating one"
                );
                self.finish_run(&stream, SyncEvent::stopped(self.connector));
            }
        }

        self.stop_requested.store(false, Ordering::SeqCst);
        Ok(())
    }
}
