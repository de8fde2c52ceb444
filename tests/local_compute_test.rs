// ABOUTME: Tests for the in-process compute worker
// ABOUTME: Checks power, heart rate, pace, bounds, zones, deflation and rejection paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Duration;
use common::{settings_with_ftp, utc};
use pierre_activity_sync::compute::{ActivityComputeRequest, ComputeWorker, LocalComputeWorker};
use pierre_core::errors::ComputeError;
use pierre_core::models::{
    Activity, AthleteSnapshot, BareActivity, Gender, SportType, Streams, UserSettings,
};

const SECONDS: usize = 1200;

fn snapshot() -> AthleteSnapshot {
    AthleteSnapshot {
        gender: Gender::Men,
        settings: settings_with_ftp(200.0),
        valid_from: utc(2020, 1, 1),
        valid_until: None,
    }
}

fn activity(sport: SportType, seconds: i64) -> Activity {
    let start = utc(2024, 4, 2) + Duration::hours(18);
    Activity::new(
        BareActivity {
            id: "65f0c0ffee00000000000002".into(),
            name: "Evening session".into(),
            sport,
            start_time: start,
            end_time: start + Duration::seconds(seconds),
            has_power_meter: true,
            trainer: false,
            commute: false,
            manual: false,
        },
        snapshot(),
    )
}

fn time() -> Vec<f64> {
    (0..SECONDS).map(|second| second as f64).collect()
}

fn steady_ride_streams() -> Streams {
    Streams {
        time: time(),
        watts: vec![200.0; SECONDS],
        heartrate: vec![150.0; SECONDS],
        velocity_smooth: vec![9.0; SECONDS],
        latlng: (0..SECONDS)
            .map(|i| [45.0 + i as f64 * 1e-5, 6.0])
            .collect(),
        ..Streams::default()
    }
}

fn request(activity: Activity, streams: Option<Streams>) -> ActivityComputeRequest {
    ActivityComputeRequest {
        activity,
        athlete_snapshot: snapshot(),
        user_settings: UserSettings::default(),
        streams,
        deflate_streams: false,
        return_peaks: true,
        return_zones: false,
        bounds: None,
        is_owner: true,
    }
}

fn close(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|value| (value - expected).abs() < 1e-6)
}

#[tokio::test]
async fn test_steady_ride_power_stats() {
    let worker = LocalComputeWorker::new();
    let ride = activity(SportType::Ride, SECONDS as i64 - 1);

    let response = worker
        .compute(request(ride, Some(steady_ride_streams())))
        .await
        .unwrap();

    let stats = &response.computed_activity.stats;
    let power = stats.power.as_ref().unwrap();
    assert!(close(power.avg, 200.0));
    assert!(close(power.weighted, 200.0));
    assert!(close(power.max, 200.0));
    assert!(close(power.work, 239.8));
    assert!(close(power.intensity_factor, 1.0));
    assert!(close(power.avg_kg, 200.0 / 70.0));
    assert!(power.zones.is_none());
    let ranges: Vec<u32> = power.peaks.as_ref().unwrap().iter().map(|p| p.range).collect();
    assert_eq!(ranges, vec![5, 10, 20, 30, 60, 120, 300, 600]);

    let heart_rate = stats.heart_rate.as_ref().unwrap();
    assert!(close(heart_rate.avg, 150.0));
    assert!(close(heart_rate.avg_reserve, 100.0 / 140.0 * 100.0));

    assert!(stats.pace.is_none());
    assert!(close(stats.elapsed_time, 1199.0));
    assert!(stats.scores.as_ref().and_then(|s| s.stress.as_ref()).is_some());
    assert!(response.deflated_streams.is_none());
    assert!(response.computed_activity.lat_lng_center.is_some());
}

#[tokio::test]
async fn test_runs_get_pace_per_kilometer() {
    let worker = LocalComputeWorker::new();
    let streams = Streams {
        time: time(),
        velocity_smooth: vec![4.0; SECONDS],
        ..Streams::default()
    };

    let response = worker
        .compute(request(activity(SportType::Run, SECONDS as i64 - 1), Some(streams)))
        .await
        .unwrap();

    let stats = response.computed_activity.stats;
    assert!(close(stats.speed.as_ref().unwrap().avg, 4.0));
    assert!(close(stats.pace.unwrap().avg, 250.0));
    assert!(stats.power.is_none());
    assert!(close(stats.distance, 4.0 * 1199.0));
}

#[tokio::test]
async fn test_zones_are_returned_on_request() {
    let worker = LocalComputeWorker::new();
    let mut with_zones = request(
        activity(SportType::Ride, SECONDS as i64 - 1),
        Some(steady_ride_streams()),
    );
    with_zones.return_zones = true;
    with_zones.return_peaks = false;

    let response = worker.compute(with_zones).await.unwrap();

    let power = response.computed_activity.stats.power.unwrap();
    assert!(power.zones.is_some_and(|zones| !zones.is_empty()));
    assert!(power.peaks.is_none());
}

#[tokio::test]
async fn test_bounds_restrict_samples() {
    let worker = LocalComputeWorker::new();
    let mut streams = steady_ride_streams();
    for watts in &mut streams.watts[600..] {
        *watts = 400.0;
    }
    let mut bounded = request(activity(SportType::Ride, SECONDS as i64 - 1), Some(streams));
    bounded.bounds = Some([0, 599]);
    bounded.deflate_streams = true;

    let response = worker.compute(bounded).await.unwrap();

    assert!(close(
        response.computed_activity.stats.power.unwrap().max,
        200.0
    ));
    let inflated = Streams::inflate(&response.deflated_streams.unwrap()).unwrap();
    assert_eq!(inflated.time.len(), 600);
    assert_eq!(inflated.latlng.len(), 600);
}

#[tokio::test]
async fn test_activity_without_streams_only_gets_elapsed_time() {
    let worker = LocalComputeWorker::new();
    let mut no_streams = request(activity(SportType::Workout, 1800), None);
    no_streams.deflate_streams = true;

    let response = worker.compute(no_streams).await.unwrap();

    let stats = response.computed_activity.stats;
    assert!(close(stats.elapsed_time, 1800.0));
    assert!(stats.power.is_none());
    assert!(response.deflated_streams.is_none());
}

#[tokio::test]
async fn test_activity_ending_before_start_is_rejected() {
    let worker = LocalComputeWorker::new();

    let err = worker
        .compute(request(activity(SportType::Ride, -60), None))
        .await
        .unwrap_err();

    assert!(matches!(err, ComputeError::Rejected { .. }));
}
