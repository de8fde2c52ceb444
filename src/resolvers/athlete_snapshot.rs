// ABOUTME: Resolves the athlete profile in force at a given instant from a profile history
// ABOUTME: Falls back to the earliest entry and flags the approximation when none applies yet
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use pierre_core::constants::sync::SNAPSHOT_MEMO_CAPACITY;
use pierre_core::errors::{ConnectorError, ConnectorResult};
use pierre_core::models::{AthleteProfileHistory, AthleteSnapshot, DatedAthleteSettings, Gender};
use tracing::debug;

/// Outcome of a snapshot lookup
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSnapshot {
    /// Profile to use for the activity
    pub snapshot: AthleteSnapshot,
    /// The query preceded every history entry, the earliest one was used instead
    pub settings_lack: bool,
}

/// Answers "which athlete profile applied at instant t"
///
/// Entries are sorted by `valid_from` on construction. Each entry is valid
/// until the next one starts; the last one stays open. Lookups are memoized
/// per exact instant, up to `SNAPSHOT_MEMO_CAPACITY` entries.
#[derive(Debug)]
pub struct AthleteSnapshotResolver {
    gender: Gender,
    entries: Vec<DatedAthleteSettings>,
    memo: DashMap<DateTime<Utc>, ResolvedSnapshot>,
}

impl AthleteSnapshotResolver {
    /// Build a resolver over `history`
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::EmptyAthleteHistory` if the history holds no entry
    pub fn new(history: &AthleteProfileHistory) -> ConnectorResult<Self> {
        if history.history.is_empty() {
            return Err(ConnectorError::EmptyAthleteHistory);
        }
        let mut entries = history.history.clone();
        entries.sort_by_key(|entry| entry.valid_from);
        Ok(Self {
            gender: history.gender,
            entries,
            memo: DashMap::new(),
        })
    }

    /// Number of history entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of memoized lookups
    #[must_use]
    pub fn memoized(&self) -> usize {
        self.memo.len()
    }

    /// Always false: construction rejects empty histories
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the snapshot valid at `at`
    ///
    /// Picks the latest entry starting at or before `at`. When `at` precedes
    /// all entries the earliest one is returned with `settings_lack` set.
    /// A future entry is never returned for a later query.
    #[must_use]
    pub fn resolve(&self, at: DateTime<Utc>) -> ResolvedSnapshot {
        if let Some(cached) = self.memo.get(&at) {
            return cached.clone();
        }

        let applicable = self.entries.partition_point(|entry| entry.valid_from <= at);
        let (index, settings_lack) = match applicable {
            0 => (0, true),
            count => (count - 1, false),
        };

        let entry = &self.entries[index];
        let resolved = ResolvedSnapshot {
            snapshot: AthleteSnapshot {
                gender: self.gender,
                settings: entry.settings.clone(),
                valid_from: entry.valid_from,
                valid_until: self.entries.get(index + 1).map(|next| next.valid_from),
            },
            settings_lack,
        };

        if settings_lack {
            debug!(at = %at, "No athlete settings before activity date, using earliest entry");
        }
        if self.memo.len() < SNAPSHOT_MEMO_CAPACITY {
            self.memo.insert(at, resolved.clone());
        }
        resolved
    }
}
