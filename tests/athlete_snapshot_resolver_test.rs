// ABOUTME: Tests for athlete snapshot resolution from a dated profile history
// ABOUTME: Covers in-range lookups, validity bounds, early activities and empty histories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Duration;
use common::{ftp_history, settings_with_ftp, utc};
use pierre_activity_sync::resolvers::AthleteSnapshotResolver;
use pierre_core::constants::sync::SNAPSHOT_MEMO_CAPACITY;
use pierre_core::errors::ConnectorError;
use pierre_core::models::{AthleteProfileHistory, DatedAthleteSettings, Gender};

#[test]
fn test_resolves_entry_in_force_at_activity_start() {
    let resolver = AthleteSnapshotResolver::new(&ftp_history()).unwrap();

    let first = resolver.resolve(utc(2020, 8, 15));
    assert_eq!(first.snapshot.settings.cycling_ftp, Some(200.0));
    assert_eq!(first.snapshot.valid_from, utc(2020, 1, 1));
    assert_eq!(first.snapshot.valid_until, Some(utc(2021, 6, 1)));
    assert!(!first.settings_lack);

    let latest = resolver.resolve(utc(2023, 3, 1));
    assert_eq!(latest.snapshot.settings.cycling_ftp, Some(220.0));
    assert_eq!(latest.snapshot.valid_until, None);
    assert!(!latest.settings_lack);
}

#[test]
fn test_valid_from_is_inclusive() {
    let resolver = AthleteSnapshotResolver::new(&ftp_history()).unwrap();

    let at_boundary = resolver.resolve(utc(2021, 6, 1));
    assert_eq!(at_boundary.snapshot.settings.cycling_ftp, Some(220.0));

    let just_before = resolver.resolve(utc(2021, 6, 1) - Duration::seconds(1));
    assert_eq!(just_before.snapshot.settings.cycling_ftp, Some(200.0));
    assert!(just_before.snapshot.contains(utc(2021, 6, 1) - Duration::seconds(1)));
    assert!(!just_before.snapshot.contains(utc(2021, 6, 1)));
}

#[test]
fn test_activity_before_history_uses_earliest_entry_and_flags_lack() {
    let resolver = AthleteSnapshotResolver::new(&ftp_history()).unwrap();

    let resolved = resolver.resolve(utc(2019, 5, 10));
    assert!(resolved.settings_lack);
    assert_eq!(resolved.snapshot.settings.cycling_ftp, Some(200.0));
    assert_eq!(resolved.snapshot.valid_from, utc(2020, 1, 1));
}

#[test]
fn test_repeated_lookups_are_stable() {
    let resolver = AthleteSnapshotResolver::new(&ftp_history()).unwrap();
    let at = utc(2022, 1, 1);
    assert_eq!(resolver.resolve(at), resolver.resolve(at));
}

#[test]
fn test_sub_second_switch_does_not_depend_on_lookup_order() {
    let switch = utc(2021, 6, 1) + Duration::milliseconds(500);
    let history = AthleteProfileHistory {
        gender: Gender::Men,
        history: vec![
            DatedAthleteSettings {
                valid_from: utc(2020, 1, 1),
                settings: settings_with_ftp(200.0),
            },
            DatedAthleteSettings {
                valid_from: switch,
                settings: settings_with_ftp(220.0),
            },
        ],
    };
    let before_switch = utc(2021, 6, 1) + Duration::milliseconds(200);
    let after_switch = utc(2021, 6, 1) + Duration::milliseconds(800);

    let fresh = AthleteSnapshotResolver::new(&history).unwrap();
    let fresh_after = fresh.resolve(after_switch);

    let warmed = AthleteSnapshotResolver::new(&history).unwrap();
    let warmed_before = warmed.resolve(before_switch);
    let warmed_after = warmed.resolve(after_switch);

    assert_eq!(warmed_before.snapshot.settings.cycling_ftp, Some(200.0));
    assert_eq!(fresh_after.snapshot.settings.cycling_ftp, Some(220.0));
    assert_eq!(fresh_after, warmed_after);
}

#[test]
fn test_memoized_lookups_are_bounded() {
    let resolver = AthleteSnapshotResolver::new(&ftp_history()).unwrap();
    let start = utc(2022, 1, 1);
    for offset in 0..SNAPSHOT_MEMO_CAPACITY + 100 {
        let at = start + Duration::seconds(i64::try_from(offset).unwrap());
        let resolved = resolver.resolve(at);
        assert_eq!(resolved.snapshot.settings.cycling_ftp, Some(220.0));
    }
    assert_eq!(resolver.memoized(), SNAPSHOT_MEMO_CAPACITY);
}

#[test]
fn test_gender_is_carried_to_snapshots() {
    let history =
        AthleteProfileHistory::single(Gender::Women, utc(2020, 1, 1), settings_with_ftp(180.0));
    let resolver = AthleteSnapshotResolver::new(&history).unwrap();
    assert_eq!(resolver.len(), 1);
    assert_eq!(resolver.resolve(utc(2024, 1, 1)).snapshot.gender, Gender::Women);
}

#[test]
fn test_empty_history_is_rejected() {
    let history = AthleteProfileHistory::default();
    let err = AthleteSnapshotResolver::new(&history).unwrap_err();
    assert!(matches!(err, ConnectorError::EmptyAthleteHistory));
}
