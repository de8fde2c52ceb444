// ABOUTME: Athlete profile history, dated settings and resolved athlete snapshots
// ABOUTME: Also carries the user settings forwarded to the compute worker
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Athlete gender, used by heart rate based scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male athlete
    #[default]
    Men,
    /// Female athlete
    Women,
}

/// Lactate threshold heart rates, per sport when known
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LactateThreshold {
    /// Default threshold (bpm)
    pub default: Option<f64>,
    /// Cycling threshold (bpm)
    pub cycling: Option<f64>,
    /// Running threshold (bpm)
    pub running: Option<f64>,
}

/// Physiological settings of an athlete at a point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AthleteSettings {
    /// Maximum heart rate (bpm)
    pub max_hr: Option<f64>,
    /// Resting heart rate (bpm)
    pub rest_hr: Option<f64>,
    /// Lactate threshold heart rates
    pub lthr: LactateThreshold,
    /// Cycling functional threshold power (watts)
    pub cycling_ftp: Option<f64>,
    /// Running functional threshold pace (s/km)
    pub running_ftp: Option<f64>,
    /// Swimming functional threshold pace (m/min)
    pub swim_ftp: Option<f64>,
    /// Body weight (kg)
    pub weight: Option<f64>,
}

/// Athlete settings valid from a given instant onward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedAthleteSettings {
    /// Start of validity (inclusive)
    pub valid_from: DateTime<Utc>,
    /// Settings applying from `valid_from` until the next entry
    pub settings: AthleteSettings,
}

/// Profile history of an athlete
///
/// Entries are kept in any order here; the snapshot resolver sorts them by
/// `valid_from` before answering lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfileHistory {
    /// Athlete gender
    #[serde(default)]
    pub gender: Gender,
    /// Dated settings
    pub history: Vec<DatedAthleteSettings>,
}

impl AthleteProfileHistory {
    /// Create a history holding a single entry valid from `valid_from`
    #[must_use]
    pub fn single(gender: Gender, valid_from: DateTime<Utc>, settings: AthleteSettings) -> Self {
        Self {
            gender,
            history: vec![DatedAthleteSettings {
                valid_from,
                settings,
            }],
        }
    }
}

/// Athlete profile valid over `[valid_from, valid_until)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteSnapshot {
    /// Athlete gender
    pub gender: Gender,
    /// Settings in force over the interval
    pub settings: AthleteSettings,
    /// Start of validity (inclusive)
    pub valid_from: DateTime<Utc>,
    /// End of validity (exclusive), `None` when still current
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
}

impl AthleteSnapshot {
    /// Tell whether `at` falls in the validity interval
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.valid_from && self.valid_until.map_or(true, |until| at < until)
    }
}

/// Unit system preferred by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemUnits {
    /// Kilometers, meters, kilograms
    #[default]
    Metric,
    /// Miles, feet, pounds
    Imperial,
}

/// User settings forwarded to the compute worker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Preferred unit system
    pub system_units: SystemUnits,
    /// Estimate power from speed and grade when no power meter is present
    pub has_estimated_power: bool,
    /// Estimate running power
    pub has_estimated_running_power: bool,
}
