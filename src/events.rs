// ABOUTME: Replayable, ordered, multi-subscriber stream of sync events for one sync run
// ABOUTME: Late subscribers see every event of the run; a new run always gets a new stream
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Sync event stream
//!
//! A run keeps its full event history. Subscriptions share the history and
//! keep a cursor into it, so they never mutate the stream and all of them
//! observe the same order. Once closed, the stream accepts no more
//! events and subscriptions end after draining the history.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_stream::stream;
use futures_util::Stream;
use pierre_core::models::SyncEvent;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct StreamState {
    events: Vec<SyncEvent>,
    closed: bool,
}

#[derive(Debug, Default)]
struct StreamInner {
    state: Mutex<StreamState>,
    notify: Notify,
}

impl StreamInner {
    fn lock(&self) -> MutexGuard<'_, StreamState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Event stream of a single sync run
///
/// Cloning yields another handle on the same stream.
#[derive(Debug, Clone, Default)]
pub struct SyncEventStream {
    inner: Arc<StreamInner>,
}

impl SyncEventStream {
    /// Create an empty, open stream
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stream already closed, holding `events`
    #[must_use]
    pub fn closed_with(events: Vec<SyncEvent>) -> Self {
        let stream = Self::new();
        {
            let mut state = stream.inner.lock();
            state.events = events;
            state.closed = true;
        }
        stream
    }

    /// Append an event; returns `false` if the stream is already closed
    pub fn push(&self, event: SyncEvent) -> bool {
        {
            let mut state = self.inner.lock();
            if state.closed {
                return false;
            }
            state.events.push(event);
        }
        self.inner.notify.notify_waiters();
        true
    }

    /// Append a final event and close, atomically
    ///
    /// Returns `false` (and appends nothing) if the stream was already closed.
    pub fn push_and_close(&self, event: SyncEvent) -> bool {
        {
            let mut state = self.inner.lock();
            if state.closed {
                return false;
            }
            state.events.push(event);
            state.closed = true;
        }
        self.inner.notify.notify_waiters();
        true
    }

    /// Close the stream; subscribers end once they drained the history
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.inner.notify.notify_waiters();
    }

    /// Tell whether the stream is closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Snapshot of the events emitted so far
    #[must_use]
    pub fn events(&self) -> Vec<SyncEvent> {
        self.inner.lock().events.clone()
    }

    /// Number of events emitted so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    /// Tell whether no event was emitted yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tell whether both handles point at the same stream
    #[must_use]
    pub fn same_stream(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Subscribe from the first event of the run
    #[must_use]
    pub fn subscribe(&self) -> SyncEventSubscription {
        SyncEventSubscription {
            stream: Arc::clone(&self.inner),
            cursor: 0,
        }
    }
}

/// Read-only cursor over a [`SyncEventStream`]
#[derive(Debug)]
pub struct SyncEventSubscription {
    stream: Arc<StreamInner>,
    cursor: usize,
}

impl SyncEventSubscription {
    /// Next event in emission order
    ///
    /// Returns `None` once the stream is closed and drained.
    pub async fn next(&mut self) -> Option<SyncEvent> {
        let inner = Arc::clone(&self.stream);
        loop {
            let notified = inner.notify.notified();
            tokio::pin!(notified);
            // Register before reading so a push between the read and the
            // await still wakes us.
            notified.as_mut().enable();

            {
                let state = inner.lock();
                if let Some(event) = state.events.get(self.cursor) {
                    self.cursor += 1;
                    return Some(event.clone());
                }
                if state.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Convert into a `futures_util::Stream`
    pub fn into_stream(self) -> impl Stream<Item = SyncEvent> + Send {
        let mut subscription = self;
        stream! {
            while let Some(event) = subscription.next().await {
                yield event;
            }
        }
    }
}
