// ABOUTME: Bare and fully computed activity models produced by connectors
// ABOUTME: Laps, extras and the source-stats overlay of a synced activity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ActivityFileType, ActivityStats, AthleteSnapshot, ConnectorType, SportType};

/// Minimal recorded facts of an activity, as produced by a source parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BareActivity {
    /// Identifier; replaced by a generated id when the activity is enriched
    #[serde(default)]
    pub id: String,
    /// Human-readable name/title of the activity
    pub name: String,
    /// Sport of the activity
    pub sport: SportType,
    /// When the activity started (UTC)
    pub start_time: DateTime<Utc>,
    /// When the activity ended (UTC)
    pub end_time: DateTime<Utc>,
    /// Power comes from a real power meter
    #[serde(default)]
    pub has_power_meter: bool,
    /// Recorded on a home trainer
    #[serde(default)]
    pub trainer: bool,
    /// Tagged as commute
    #[serde(default)]
    pub commute: bool,
    /// Manually entered activity (no recording)
    #[serde(default)]
    pub manual: bool,
}

impl BareActivity {
    /// Duration between start and end, in seconds
    #[must_use]
    pub fn duration_seconds(&self) -> i64 {
        (self.end_time - self.start_time).num_seconds()
    }
}

/// A lap of an activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lap {
    /// Lap index
    pub id: u32,
    /// Lap is an active (not rest) lap
    pub active: bool,
    /// Start and end sample indexes in the streams
    pub indexes: Vec<usize>,
    /// Distance (m)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Elapsed time (s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<f64>,
    /// Moving time (s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving_time: Option<f64>,
    /// Average speed (m/s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_speed: Option<f64>,
    /// Average heart rate (bpm)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_hr: Option<f64>,
    /// Average power (watts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_watts: Option<f64>,
    /// Average cadence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_cadence: Option<f64>,
}

/// Origin of an activity synced from a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileExtras {
    /// Path of the source file
    pub path: String,
    /// Format of the source file
    pub file_type: ActivityFileType,
}

/// Source-specific extras kept with an activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityExtras {
    /// Identifier of the activity on the remote source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_activity_id: Option<String>,
    /// File the activity came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileExtras>,
}

/// A canonical, fully computed activity
///
/// `stats` is always the computed tree; `src_stats` keeps what the source
/// reported, for reference only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Recorded facts
    #[serde(flatten)]
    pub bare: BareActivity,
    /// Athlete profile in force when the activity started
    pub athlete_snapshot: AthleteSnapshot,
    /// Computed statistics, overlaid by source stats
    pub stats: ActivityStats,
    /// Statistics as reported by the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_stats: Option<ActivityStats>,
    /// Laps
    #[serde(default)]
    pub laps: Vec<Lap>,
    /// Content fingerprint used for deduplication
    #[serde(default)]
    pub hash: String,
    /// Connector the activity was synced with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<ConnectorType>,
    /// Creation instant in the local store
    pub creation_time: DateTime<Utc>,
    /// Last edit instant in the local store
    pub last_edit_time: DateTime<Utc>,
    /// Sport was detected automatically rather than reported
    #[serde(default)]
    pub auto_detected_type: bool,
    /// Pool swim (`true`) or open water swim (`false`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_swim_pool: Option<bool>,
    /// Athlete settings were approximated when resolving the snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_lack: Option<bool>,
    /// Barycenter of GPS positions as `[lat, lng]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_lng_center: Option<[f64; 2]>,
    /// Recording device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Free notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Source-specific extras
    #[serde(default)]
    pub extras: ActivityExtras,
}

impl Activity {
    /// Create an activity from its bare facts and resolved athlete snapshot
    ///
    /// Statistics start empty until the compute worker fills them.
    #[must_use]
    pub fn new(bare: BareActivity, athlete_snapshot: AthleteSnapshot) -> Self {
        let now = Utc::now();
        Self {
            bare,
            athlete_snapshot,
            stats: ActivityStats::default(),
            src_stats: None,
            laps: Vec::new(),
            hash: String::new(),
            connector: None,
            creation_time: now,
            last_edit_time: now,
            auto_detected_type: false,
            is_swim_pool: None,
            settings_lack: None,
            lat_lng_center: None,
            device: None,
            notes: None,
            extras: ActivityExtras::default(),
        }
    }

    /// Activity identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.bare.id
    }

    /// Sport of the activity
    #[must_use]
    pub const fn sport(&self) -> &SportType {
        &self.bare.sport
    }

    /// Tell whether two activities are identical field by field
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        self == other
    }
}
