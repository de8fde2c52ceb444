// ABOUTME: Activity statistics tree (speed, power, heart rate, cadence, grade, elevation, scores)
// ABOUTME: Every leaf is optional so the same tree doubles as a partial source-stats overlay
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Activity Statistics
//!
//! `ActivityStats` is produced by the compute worker for every synced activity.
//! Sources (remote APIs, activity files) also report a subset of these values;
//! connectors express that subset as an `ActivityStats` where only the known
//! leaves are set, and merge it over the computed tree with
//! [`ActivityStats::overlaid_with`].

use serde::{Deserialize, Serialize};

use crate::merge::deep_merge;

/// Best average value reached over a window of `range` seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Window length (seconds)
    pub range: u32,
    /// Best average value over the window
    pub result: f64,
}

/// Time (or value) distribution on up, flat and down slopes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlopeStats {
    /// Value on ascending slopes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up: Option<f64>,
    /// Value on flat sections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flat: Option<f64>,
    /// Value on descending slopes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down: Option<f64>,
    /// Total over all slopes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

/// Overall terrain profile of an activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlopeProfile {
    /// Mostly flat terrain
    Flat,
    /// Rolling or mountainous terrain
    Hilly,
}

/// Left/right split expressed in percent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeftRightPercent {
    /// Left side share
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    /// Right side share
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
}

/// A single zone with the time spent in it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneStats {
    /// Lower bound of the zone
    pub from: f64,
    /// Upper bound of the zone
    pub to: f64,
    /// Seconds spent in the zone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<f64>,
}

/// Distribution statistics shared by most metric blocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quartiles {
    /// Lower quartile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_q: Option<f64>,
    /// Median
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    /// Upper quartile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_q: Option<f64>,
    /// Standard deviation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
}

/// Speed statistics (m/s)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedStats {
    /// Average moving speed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    /// Maximum speed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Best 20 minutes average speed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best20min: Option<f64>,
    /// Distribution
    #[serde(flatten)]
    pub quartiles: Quartiles,
    /// Time in zones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<ZoneStats>>,
    /// Best-effort windows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peaks: Option<Vec<Peak>>,
}

/// Pace statistics (seconds per kilometer, or per 100m for swims)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaceStats {
    /// Average pace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    /// Grade adjusted average pace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_avg: Option<f64>,
    /// Fastest pace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Best 20 minutes pace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best20min: Option<f64>,
    /// Distribution
    #[serde(flatten)]
    pub quartiles: Quartiles,
    /// Time in zones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<ZoneStats>>,
}

/// Power statistics (watts)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerStats {
    /// Average power
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    /// Average power per kilogram
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_kg: Option<f64>,
    /// Weighted (normalized) power
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted: Option<f64>,
    /// Weighted power per kilogram
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_kg: Option<f64>,
    /// Maximum power
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Mechanical work (kJ)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work: Option<f64>,
    /// Best 20 minutes power
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best20min: Option<f64>,
    /// Weighted over average power
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variability_index: Option<f64>,
    /// Weighted power over FTP
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity_factor: Option<f64>,
    /// Distribution
    #[serde(flatten)]
    pub quartiles: Quartiles,
    /// Time in zones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<ZoneStats>>,
    /// Best-effort windows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peaks: Option<Vec<Peak>>,
}

/// Heart rate statistics (bpm)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartRateStats {
    /// Average heart rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    /// Maximum heart rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Average heart rate reserve (%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_reserve: Option<f64>,
    /// Maximum heart rate reserve (%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_reserve: Option<f64>,
    /// Best 20 minutes heart rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best20min: Option<f64>,
    /// Best 60 minutes heart rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best60min: Option<f64>,
    /// Distribution
    #[serde(flatten)]
    pub quartiles: Quartiles,
    /// Time in zones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<ZoneStats>>,
    /// Best-effort windows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peaks: Option<Vec<Peak>>,
}

/// Cadence statistics (rpm or spm)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceStats {
    /// Average cadence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    /// Maximum cadence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Average cadence while pedaling/striding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_active: Option<f64>,
    /// Share of time with a non-zero cadence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_ratio: Option<f64>,
    /// Seconds with a non-zero cadence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_time: Option<f64>,
    /// Total revolutions or strides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycles: Option<f64>,
    /// Distance per revolution or stride (m)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dist_per_cycle: Option<f64>,
    /// Cadence by slope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope: Option<SlopeStats>,
    /// Distribution
    #[serde(flatten)]
    pub quartiles: Quartiles,
    /// Time in zones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<ZoneStats>>,
    /// Best-effort windows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peaks: Option<Vec<Peak>>,
}

/// Grade statistics (%)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeStats {
    /// Average grade
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    /// Steepest climb
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Steepest descent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Time on each slope kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope_time: Option<SlopeStats>,
    /// Speed on each slope kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope_speed: Option<SlopeStats>,
    /// Distance on each slope kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope_distance: Option<SlopeStats>,
    /// Terrain profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope_profile: Option<SlopeProfile>,
    /// Distribution
    #[serde(flatten)]
    pub quartiles: Quartiles,
    /// Time in zones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<ZoneStats>>,
    /// Best-effort windows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peaks: Option<Vec<Peak>>,
}

/// Elevation statistics (m)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationStats {
    /// Average altitude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    /// Highest altitude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Lowest altitude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Cumulated ascent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ascent: Option<f64>,
    /// Cumulated descent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descent: Option<f64>,
    /// Vertical ascent speed (m/h)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ascent_speed: Option<f64>,
    /// Distribution
    #[serde(flatten)]
    pub quartiles: Quartiles,
    /// Time in altitude zones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_zones: Option<Vec<ZoneStats>>,
}

/// Cycling dynamics reported by power meters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CyclingDynamicsStats {
    /// Seconds spent standing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standing_time: Option<f64>,
    /// Seconds spent seated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seated_time: Option<f64>,
    /// Left/right power balance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<LeftRightPercent>,
    /// Pedal smoothness
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pedal_smoothness: Option<LeftRightPercent>,
    /// Torque effectiveness
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torque_effectiveness: Option<LeftRightPercent>,
}

/// Running dynamics reported by watches or pods
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunningDynamicsStats {
    /// Ground contact balance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stance_time_balance: Option<LeftRightPercent>,
    /// Ground contact time (ms)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stance_time: Option<f64>,
    /// Vertical oscillation (cm)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_oscillation: Option<f64>,
    /// Vertical ratio (%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_ratio: Option<f64>,
    /// Average stride length (m)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_stride_length: Option<f64>,
}

/// Sport specific dynamics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsStats {
    /// Cycling dynamics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycling: Option<CyclingDynamicsStats>,
    /// Running dynamics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running: Option<RunningDynamicsStats>,
}

/// Aerobic/anaerobic training effect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingEffect {
    /// Aerobic training effect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aerobic: Option<f64>,
    /// Anaerobic training effect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anaerobic: Option<f64>,
}

/// Stress scores; all of them can be recomputed from streams
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressScores {
    /// Heart rate stress score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hrss: Option<f64>,
    /// Heart rate stress score per hour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hrss_per_hour: Option<f64>,
    /// Training impulse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trimp: Option<f64>,
    /// Training impulse per hour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trimp_per_hour: Option<f64>,
    /// Running stress score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rss: Option<f64>,
    /// Running stress score per hour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rss_per_hour: Option<f64>,
    /// Swim stress score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sss: Option<f64>,
    /// Swim stress score per hour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sss_per_hour: Option<f64>,
    /// Power stress score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pss: Option<f64>,
    /// Power stress score per hour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pss_per_hour: Option<f64>,
    /// Training effect reported by the device
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_effect: Option<TrainingEffect>,
}

/// SWOLF per pool length
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwolfScores {
    /// SWOLF for 25m pools
    #[serde(rename = "25", skip_serializing_if = "Option::is_none")]
    pub pool25: Option<f64>,
    /// SWOLF for 50m pools
    #[serde(rename = "50", skip_serializing_if = "Option::is_none")]
    pub pool50: Option<f64>,
}

/// Scores block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scores {
    /// Stress scores
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress: Option<StressScores>,
    /// Running performance index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_perf_index: Option<f64>,
    /// SWOLF scores
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swolf: Option<SwolfScores>,
}

/// Full statistics tree of an activity
///
/// When produced by the compute worker every block that the streams allow is
/// populated. When built by a connector from source-native fields only the
/// reported leaves are set; see [`ActivityStats::overlaid_with`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityStats {
    /// Distance (m)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Elevation gain (m)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,
    /// Elapsed time (s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<f64>,
    /// Moving time (s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving_time: Option<f64>,
    /// Pause time (s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_time: Option<f64>,
    /// Moving over elapsed time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_ratio: Option<f64>,
    /// Energy (kcal)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    /// Energy per hour (kcal/h)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_per_hour: Option<f64>,
    /// Scores
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<Scores>,
    /// Speed block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<SpeedStats>,
    /// Pace block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pace: Option<PaceStats>,
    /// Power block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<PowerStats>,
    /// Heart rate block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<HeartRateStats>,
    /// Cadence block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence: Option<CadenceStats>,
    /// Grade block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<GradeStats>,
    /// Elevation block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<ElevationStats>,
    /// Dynamics block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamics: Option<DynamicsStats>,
}

impl ActivityStats {
    /// Tell whether no leaf of the tree is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Return a new tree made of `self` with every leaf set in `overlay` on top
    ///
    /// The merge is recursive through nested blocks; leaves absent from the
    /// overlay keep the value of `self`. Neither input is modified.
    ///
    /// # Errors
    ///
    /// Returns an error if either tree cannot be represented as JSON
    pub fn overlaid_with(&self, overlay: &Self) -> Result<Self, serde_json::Error> {
        let mut merged = serde_json::to_value(self)?;
        deep_merge(&mut merged, &serde_json::to_value(overlay)?);
        serde_json::from_value(merged)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn computed() -> ActivityStats {
        ActivityStats {
            distance: Some(42_000.0),
            moving_time: Some(3_600.0),
            power: Some(PowerStats {
                avg: Some(150.0),
                max: Some(600.0),
                peaks: Some(vec![
                    Peak { range: 5, result: 580.0 },
                    Peak { range: 60, result: 320.0 },
                ]),
                ..PowerStats::default()
            }),
            heart_rate: Some(HeartRateStats {
                avg: Some(142.0),
                ..HeartRateStats::default()
            }),
            ..ActivityStats::default()
        }
    }

    #[test]
    fn test_empty_overlay_keeps_computed_tree() {
        let stats = computed();
        let merged = stats.overlaid_with(&ActivityStats::default()).unwrap();
        assert_eq!(merged, stats);
    }

    #[test]
    fn test_overlay_wins_leaf_by_leaf() {
        let overlay = ActivityStats {
            power: Some(PowerStats {
                avg: Some(160.0),
                ..PowerStats::default()
            }),
            calories: Some(900.0),
            ..ActivityStats::default()
        };

        let merged = computed().overlaid_with(&overlay).unwrap();
        let power = merged.power.unwrap();
        assert_eq!(power.avg, Some(160.0));
        assert_eq!(power.max, Some(600.0));
        assert_eq!(power.peaks.map(|p| p.len()), Some(2));
        assert_eq!(merged.calories, Some(900.0));
        assert_eq!(merged.distance, Some(42_000.0));
    }

    #[test]
    fn test_overlay_block_absent_from_base_is_added() {
        let overlay = ActivityStats {
            elevation: Some(ElevationStats {
                ascent: Some(350.0),
                ..ElevationStats::default()
            }),
            ..ActivityStats::default()
        };
        let merged = computed().overlaid_with(&overlay).unwrap();
        assert_eq!(merged.elevation.and_then(|e| e.ascent), Some(350.0));
    }

    #[test]
    fn test_is_empty() {
        assert!(ActivityStats::default().is_empty());
        assert!(!computed().is_empty());
    }
}
