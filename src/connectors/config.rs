// ABOUTME: Connector configuration: athlete history, user settings, priority, sync lower bound
// ABOUTME: Immutable once handed to configure(); replacing it needs another configure() call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use pierre_core::models::{AthleteProfileHistory, ConnectorType, UserSettings};
use serde::{Deserialize, Serialize};

/// Configuration of a connector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Kind of connector the configuration is meant for
    pub connector: ConnectorType,
    /// Athlete profile history used to resolve snapshots
    pub athlete_profile: AthleteProfileHistory,
    /// User settings forwarded to the compute worker
    #[serde(default)]
    pub user_settings: UserSettings,
    /// Ordering among connectors, lower first
    #[serde(default)]
    pub priority: u32,
    /// Lower bound of synced activities as epoch milliseconds
    #[serde(default)]
    pub sync_from_date_time: Option<i64>,
    /// Whether the user enabled this connector
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl ConnectorConfig {
    /// Enabled configuration with default user settings and no lower bound
    #[must_use]
    pub fn new(connector: ConnectorType, athlete_profile: AthleteProfileHistory) -> Self {
        Self {
            connector,
            athlete_profile,
            user_settings: UserSettings::default(),
            priority: 0,
            sync_from_date_time: None,
            enabled: true,
        }
    }

    /// Only sync activities from `at` onward
    #[must_use]
    pub fn with_sync_from(mut self, at: DateTime<Utc>) -> Self {
        self.sync_from_date_time = Some(at.timestamp_millis());
        self
    }

    /// Replace user settings
    #[must_use]
    pub fn with_user_settings(mut self, user_settings: UserSettings) -> Self {
        self.user_settings = user_settings;
        self
    }

    /// Lower bound as an instant, `None` when absent or out of range
    #[must_use]
    pub fn sync_from(&self) -> Option<DateTime<Utc>> {
        self.sync_from_date_time
            .and_then(DateTime::from_timestamp_millis)
    }
}
