// ABOUTME: Read interface over the local activity store consumed by connectors
// ABOUTME: In-memory implementation used by the CLI and by tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use pierre_core::errors::StoreError;
use pierre_core::models::{Activity, DeflatedActivityStreams};

/// Local activities already known to the application
#[async_trait]
pub trait LocalActivityStore: Send + Sync {
    /// Activities whose time range overlaps `[start, end]`
    async fn find_local_activities(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Activity>, StoreError>;

    /// Deflated streams of an activity, if stored
    async fn find_deflated_streams(
        &self,
        activity_id: &str,
    ) -> Result<Option<DeflatedActivityStreams>, StoreError>;
}

/// Activity store held in memory
#[derive(Debug, Default)]
pub struct InMemoryActivityStore {
    activities: DashMap<String, Activity>,
    streams: DashMap<String, DeflatedActivityStreams>,
}

impl InMemoryActivityStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an activity
    pub fn upsert_activity(&self, activity: Activity) {
        self.activities.insert(activity.id().to_owned(), activity);
    }

    /// Insert or replace deflated streams
    pub fn upsert_streams(&self, streams: DeflatedActivityStreams) {
        self.streams.insert(streams.activity_id.clone(), streams);
    }

    /// Number of stored activities
    #[must_use]
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// Tell whether the store holds no activity
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

#[async_trait]
impl LocalActivityStore for InMemoryActivityStore {
    async fn find_local_activities(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Activity>, StoreError> {
        let mut found: Vec<Activity> = self
            .activities
            .iter()
            .filter(|entry| entry.bare.start_time <= end && entry.bare.end_time >= start)
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by_key(|activity| activity.bare.start_time);
        Ok(found)
    }

    async fn find_deflated_streams(
        &self,
        activity_id: &str,
    ) -> Result<Option<DeflatedActivityStreams>, StoreError> {
        Ok(self
            .streams
            .get(activity_id)
            .map(|entry| entry.value().clone()))
    }
}
