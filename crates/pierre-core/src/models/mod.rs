// ABOUTME: Core data models for activity sync: activities, stats, streams, athletes, events
// ABOUTME: Re-exports every model so connectors import from a single place
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Provider-agnostic structures shared by every connector:
//!
//! - `BareActivity` / `Activity`: raw facts and the fully computed activity
//! - `ActivityStats`: statistics tree, also used as a partial source overlay
//! - `Streams`: recorded samples, with a deflate/inflate codec
//! - `AthleteProfileHistory` / `AthleteSnapshot`: dated athlete settings
//! - `SyncEvent`: lifecycle events of a sync run

mod activity;
mod athlete;
mod connector;
mod sport;
mod stats;
mod streams;
mod sync_event;

pub use activity::{Activity, ActivityExtras, BareActivity, FileExtras, Lap};
pub use athlete::{
    AthleteProfileHistory, AthleteSettings, AthleteSnapshot, DatedAthleteSettings, Gender,
    LactateThreshold, SystemUnits, UserSettings,
};
pub use connector::{ActivityFileType, ConnectorType};
pub use sport::SportType;
pub use stats::{
    ActivityStats, CadenceStats, CyclingDynamicsStats, DynamicsStats, ElevationStats, GradeStats,
    HeartRateStats, LeftRightPercent, PaceStats, Peak, PowerStats, Quartiles,
    RunningDynamicsStats, Scores, SlopeProfile, SlopeStats, SpeedStats, StressScores,
    SwolfScores, TrainingEffect, ZoneStats,
};
pub use streams::{DeflatedActivityStreams, Streams};
pub use sync_event::{SyncErrorDetails, SyncEvent, SyncEventPayload, SyncEventType};
