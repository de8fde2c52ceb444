// ABOUTME: Tests for activity ids and content hashes
// ABOUTME: Ids are fresh per call, content hashes are stable for the same recorded facts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Duration;
use common::utc;
use pierre_activity_sync::identity::{content_hash, generate_activity_id};
use pierre_core::models::{BareActivity, SportType};

fn morning_run() -> BareActivity {
    let start = utc(2024, 3, 10) + Duration::hours(7);
    BareActivity {
        id: String::new(),
        name: "Morning run".into(),
        sport: SportType::Run,
        start_time: start,
        end_time: start + Duration::minutes(45),
        has_power_meter: false,
        trainer: false,
        commute: false,
        manual: false,
    }
}

fn is_hex(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_hexdigit())
}

#[test]
fn test_generated_ids_are_object_id_shaped() {
    let id = generate_activity_id(&morning_run());

    assert_eq!(id.len(), 24);
    assert!(is_hex(&id));
}

#[test]
fn test_generated_ids_differ_between_calls() {
    let bare = morning_run();

    assert_ne!(generate_activity_id(&bare), generate_activity_id(&bare));
}

#[test]
fn test_content_hash_is_stable() {
    let hash = content_hash(&morning_run());

    assert_eq!(hash.len(), 24);
    assert!(is_hex(&hash));
    assert_eq!(hash, content_hash(&morning_run()));
}

#[test]
fn test_content_hash_ignores_name_and_id() {
    let renamed = BareActivity {
        id: "already-assigned".into(),
        name: "Renamed".into(),
        ..morning_run()
    };

    assert_eq!(content_hash(&renamed), content_hash(&morning_run()));
}

#[test]
fn test_content_hash_ignores_sub_second_precision() {
    let mut shifted = morning_run();
    shifted.start_time += Duration::milliseconds(400);

    assert_eq!(content_hash(&shifted), content_hash(&morning_run()));
}

#[test]
fn test_content_hash_changes_with_recorded_facts() {
    let base = content_hash(&morning_run());
    let other_sport = BareActivity {
        sport: SportType::Ride,
        ..morning_run()
    };
    let longer = BareActivity {
        end_time: morning_run().end_time + Duration::seconds(1),
        ..morning_run()
    };

    assert_ne!(content_hash(&other_sport), base);
    assert_ne!(content_hash(&longer), base);
}
