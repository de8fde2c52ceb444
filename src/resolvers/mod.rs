// ABOUTME: Resolvers turning time-indexed athlete data into values valid at an instant
// ABOUTME: Currently hosts the athlete snapshot resolver used by every connector
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Athlete profile resolution by timestamp
pub mod athlete_snapshot;

pub use athlete_snapshot::{AthleteSnapshotResolver, ResolvedSnapshot};
