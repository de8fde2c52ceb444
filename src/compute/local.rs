// ABOUTME: In-process compute worker running stats computation on the blocking thread pool
// ABOUTME: Derives the activity stats tree from streams and deflates streams on request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use pierre_core::constants::stats::{FLAT_GRADE_THRESHOLD, MOVING_SPEED_THRESHOLD};
use pierre_core::errors::ComputeError;
use pierre_core::models::{
    Activity, ActivityStats, AthleteSnapshot, CadenceStats, ElevationStats, Gender, GradeStats,
    HeartRateStats, PaceStats, PowerStats, Scores, SlopeProfile, SlopeStats, SpeedStats,
    StressScores, Streams,
};
use tokio::task;
use tracing::debug;

use super::stats::{
    ascent_descent, best_window_average, integrate, max_value, min_value, normalized_power, peaks,
    quartiles, sample_durations, time_in_zones, time_weighted_average, trimp,
};
use super::{ActivityComputeRequest, ActivityComputeResponse, ComputeWorker};

/// Heart rate zone bounds as fractions of max heart rate
const HEART_RATE_ZONE_FRACTIONS: [f64; 6] = [0.5, 0.6, 0.7, 0.8, 0.9, 1.0];

/// Power zone bounds as fractions of FTP
const POWER_ZONE_FRACTIONS: [f64; 8] = [0.0, 0.55, 0.75, 0.9, 1.05, 1.2, 1.5, 10.0];

/// Window of the `best20min` values (s)
const TWENTY_MINUTES: f64 = 1200.0;

/// Window of the `best60min` values (s)
const SIXTY_MINUTES: f64 = 3600.0;

/// Share of climbing time above which a profile counts as hilly
const HILLY_PROFILE_RATIO: f64 = 0.1;

/// Compute worker running on `tokio::task::spawn_blocking`
///
/// Each request is computed in isolation; nothing is shared between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalComputeWorker;

impl LocalComputeWorker {
    /// Create a worker
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ComputeWorker for LocalComputeWorker {
    async fn compute(
        &self,
        request: ActivityComputeRequest,
    ) -> Result<ActivityComputeResponse, ComputeError> {
        let activity_id = request.activity.id().to_owned();
        task::spawn_blocking(move || compute_blocking(request))
            .await
            .map_err(|err| ComputeError::Unavailable {
                reason: format!("compute task for activity {activity_id} failed: {err}"),
            })?
    }
}

fn compute_blocking(
    request: ActivityComputeRequest,
) -> Result<ActivityComputeResponse, ComputeError> {
    let ActivityComputeRequest {
        mut activity,
        athlete_snapshot,
        streams,
        deflate_streams,
        return_peaks,
        return_zones,
        bounds,
        ..
    } = request;

    if activity.bare.end_time < activity.bare.start_time {
        return Err(ComputeError::Rejected {
            activity_id: activity.id().to_owned(),
            reason: "activity ends before it starts".to_owned(),
        });
    }

    let streams = streams.map(|streams| bounded(streams, bounds));
    let options = ComputeOptions {
        return_peaks,
        return_zones,
    };

    activity.stats = streams.as_ref().map_or_else(
        || ActivityStats {
            elapsed_time: Some(activity.bare.duration_seconds() as f64),
            ..ActivityStats::default()
        },
        |streams| compute_stats(&activity, &athlete_snapshot, streams, options),
    );
    activity.lat_lng_center = streams.as_ref().and_then(lat_lng_center);
    activity.athlete_snapshot = athlete_snapshot;

    let deflated_streams = match (&streams, deflate_streams) {
        (Some(streams), true) => {
            Some(streams.deflate().map_err(|err| ComputeError::Rejected {
                activity_id: activity.id().to_owned(),
                reason: format!("cannot deflate streams: {err}"),
            })?)
        }
        _ => None,
    };

    debug!(activity_id = %activity.id(), "Activity computed");
    Ok(ActivityComputeResponse {
        computed_activity: activity,
        deflated_streams,
    })
}

#[derive(Debug, Clone, Copy)]
struct ComputeOptions {
    return_peaks: bool,
    return_zones: bool,
}

/// Keep samples within `[start, end]` when bounds are given
fn bounded(streams: Streams, bounds: Option<[usize; 2]>) -> Streams {
    let Some([start, end]) = bounds else {
        return streams;
    };
    let cut = |values: Vec<f64>| -> Vec<f64> {
        values
            .into_iter()
            .skip(start)
            .take(end.saturating_sub(start) + 1)
            .collect()
    };
    Streams {
        time: cut(streams.time),
        distance: cut(streams.distance),
        velocity_smooth: cut(streams.velocity_smooth),
        altitude: cut(streams.altitude),
        heartrate: cut(streams.heartrate),
        cadence: cut(streams.cadence),
        watts: cut(streams.watts),
        grade_smooth: cut(streams.grade_smooth),
        latlng: streams
            .latlng
            .into_iter()
            .skip(start)
            .take(end.saturating_sub(start) + 1)
            .collect(),
    }
}

fn lat_lng_center(streams: &Streams) -> Option<[f64; 2]> {
    if streams.latlng.is_empty() {
        return None;
    }
    let count = streams.latlng.len() as f64;
    let (lat, lng) = streams
        .latlng
        .iter()
        .fold((0.0, 0.0), |(lat, lng), point| (lat + point[0], lng + point[1]));
    Some([lat / count, lng / count])
}

/// Sample-aligned view used while computing
struct Samples<'a> {
    time: &'a [f64],
    durations: Vec<f64>,
}

impl<'a> Samples<'a> {
    fn new(time: &'a [f64]) -> Self {
        Self {
            time,
            durations: sample_durations(time),
        }
    }

    /// `values` when aligned with the time stream
    fn aligned<'b>(&self, values: &'b [f64]) -> Option<&'b [f64]> {
        (!values.is_empty() && values.len() == self.time.len()).then_some(values)
    }
}

fn compute_stats(
    activity: &Activity,
    snapshot: &AthleteSnapshot,
    streams: &Streams,
    options: ComputeOptions,
) -> ActivityStats {
    let samples = Samples::new(&streams.time);
    let elapsed_time = match activity.bare.duration_seconds() {
        seconds if seconds > 0 => seconds as f64,
        _ => samples.durations.iter().sum(),
    };

    let velocity = samples
        .aligned(&streams.velocity_smooth)
        .map(<[f64]>::to_vec)
        .or_else(|| derive_velocity(&samples, samples.aligned(&streams.distance)?));
    let moving_time = velocity.as_deref().map_or(elapsed_time, |velocity| {
        velocity
            .iter()
            .zip(&samples.durations)
            .filter(|(speed, _)| **speed > MOVING_SPEED_THRESHOLD)
            .map(|(_, dt)| dt)
            .sum()
    });
    let distance = samples
        .aligned(&streams.distance)
        .and_then(<[f64]>::last)
        .copied()
        .or_else(|| {
            velocity
                .as_deref()
                .map(|velocity| integrate(velocity, &samples.durations))
        });

    let power = compute_power(activity, snapshot, &samples, streams, options);
    let heart_rate = compute_heart_rate(snapshot, &samples, streams, options);
    let elevation = samples.aligned(&streams.altitude).map(compute_elevation);
    let speed = velocity
        .as_deref()
        .map(|velocity| compute_speed(&samples, velocity, distance, moving_time, options));
    let pace = speed
        .as_ref()
        .filter(|_| activity.sport().is_paced())
        .map(|speed| compute_pace(activity, speed));

    let calories = power.as_ref().and_then(|power| power.work);
    let stress = compute_stress(activity, snapshot, &samples, streams, power.as_ref(), elapsed_time);

    ActivityStats {
        distance,
        elevation_gain: elevation.as_ref().and_then(|elevation| elevation.ascent),
        elapsed_time: Some(elapsed_time),
        moving_time: Some(moving_time),
        pause_time: Some((elapsed_time - moving_time).max(0.0)),
        move_ratio: (elapsed_time > 0.0).then(|| moving_time / elapsed_time),
        calories,
        calories_per_hour: calories
            .filter(|_| elapsed_time > 0.0)
            .map(|kcal| kcal / elapsed_time * 3600.0),
        scores: stress.map(|stress| Scores {
            stress: Some(stress),
            ..Scores::default()
        }),
        speed,
        pace,
        power,
        heart_rate,
        cadence: compute_cadence(&samples, streams, distance, options),
        grade: compute_grade(&samples, streams, velocity.as_deref()),
        elevation,
        dynamics: None,
    }
}

fn derive_velocity(samples: &Samples<'_>, distance: &[f64]) -> Option<Vec<f64>> {
    let mut previous = *distance.first()?;
    Some(
        distance
            .iter()
            .zip(&samples.durations)
            .map(|(current, dt)| {
                let speed = if *dt > 0.0 { (current - previous) / dt } else { 0.0 };
                previous = *current;
                speed.max(0.0)
            })
            .collect(),
    )
}

fn compute_speed(
    samples: &Samples<'_>,
    velocity: &[f64],
    distance: Option<f64>,
    moving_time: f64,
    options: ComputeOptions,
) -> SpeedStats {
    let avg = distance
        .filter(|_| moving_time > 0.0)
        .map(|distance| distance / moving_time)
        .or_else(|| time_weighted_average(velocity, &samples.durations));
    SpeedStats {
        avg,
        max: max_value(velocity),
        best20min: best_window_average(samples.time, velocity, TWENTY_MINUTES),
        quartiles: quartiles(velocity),
        zones: None,
        peaks: options
            .return_peaks
            .then(|| peaks(samples.time, velocity)),
    }
}

fn compute_pace(activity: &Activity, speed: &SpeedStats) -> PaceStats {
    // Swim pace is per 100m, other paced sports per km
    let unit = if activity.sport().is_swim() { 100.0 } else { 1000.0 };
    let to_pace = |speed: f64| (speed > 0.0).then(|| unit / speed);
    PaceStats {
        avg: speed.avg.and_then(to_pace),
        max: speed.max.and_then(to_pace),
        ..PaceStats::default()
    }
}

fn compute_power(
    activity: &Activity,
    snapshot: &AthleteSnapshot,
    samples: &Samples<'_>,
    streams: &Streams,
    options: ComputeOptions,
) -> Option<PowerStats> {
    let watts = samples.aligned(&streams.watts)?;
    let avg = time_weighted_average(watts, &samples.durations);
    let weighted = normalized_power(samples.time, watts);
    let weight = snapshot.settings.weight.filter(|kg| *kg > 0.0);
    let ftp = if activity.sport().is_ride(true) {
        snapshot.settings.cycling_ftp
    } else {
        None
    }
    .filter(|ftp| *ftp > 0.0);

    Some(PowerStats {
        avg,
        avg_kg: avg.zip(weight).map(|(watts, kg)| watts / kg),
        weighted,
        weighted_kg: weighted.zip(weight).map(|(watts, kg)| watts / kg),
        max: max_value(watts),
        work: Some(integrate(watts, &samples.durations) / 1000.0),
        best20min: best_window_average(samples.time, watts, TWENTY_MINUTES),
        variability_index: weighted
            .zip(avg)
            .filter(|(_, avg)| *avg > 0.0)
            .map(|(np, avg)| np / avg),
        intensity_factor: weighted.zip(ftp).map(|(np, ftp)| np / ftp),
        quartiles: quartiles(watts),
        zones: ftp.filter(|_| options.return_zones).map(|ftp| {
            let bounds = POWER_ZONE_FRACTIONS.map(|fraction| fraction * ftp);
            time_in_zones(watts, &samples.durations, &bounds)
        }),
        peaks: options
            .return_peaks
            .then(|| peaks(samples.time, watts)),
    })
}

fn compute_heart_rate(
    snapshot: &AthleteSnapshot,
    samples: &Samples<'_>,
    streams: &Streams,
    options: ComputeOptions,
) -> Option<HeartRateStats> {
    let heartrate = samples.aligned(&streams.heartrate)?;
    let avg = time_weighted_average(heartrate, &samples.durations);
    let max = max_value(heartrate);
    let reserve = snapshot
        .settings
        .max_hr
        .zip(snapshot.settings.rest_hr)
        .filter(|(max_hr, rest_hr)| max_hr > rest_hr);
    let to_reserve = |hr: f64| {
        reserve.map(|(max_hr, rest_hr)| (hr - rest_hr) / (max_hr - rest_hr) * 100.0)
    };

    Some(HeartRateStats {
        avg,
        max,
        avg_reserve: avg.and_then(to_reserve),
        max_reserve: max.and_then(to_reserve),
        best20min: best_window_average(samples.time, heartrate, TWENTY_MINUTES),
        best60min: best_window_average(samples.time, heartrate, SIXTY_MINUTES),
        quartiles: quartiles(heartrate),
        zones: snapshot
            .settings
            .max_hr
            .filter(|_| options.return_zones)
            .map(|max_hr| {
                let bounds = HEART_RATE_ZONE_FRACTIONS.map(|fraction| fraction * max_hr);
                time_in_zones(heartrate, &samples.durations, &bounds)
            }),
        peaks: options
            .return_peaks
            .then(|| peaks(samples.time, heartrate)),
    })
}

fn compute_cadence(
    samples: &Samples<'_>,
    streams: &Streams,
    distance: Option<f64>,
    options: ComputeOptions,
) -> Option<CadenceStats> {
    let cadence = samples.aligned(&streams.cadence)?;
    let active: Vec<(f64, f64)> = cadence
        .iter()
        .zip(&samples.durations)
        .filter(|(value, _)| **value > 0.0)
        .map(|(value, dt)| (*value, *dt))
        .collect();
    let active_time: f64 = active.iter().map(|(_, dt)| dt).sum();
    let total_time: f64 = samples.durations.iter().sum();
    let cycles = integrate(cadence, &samples.durations) / 60.0;
    let (active_values, active_durations): (Vec<f64>, Vec<f64>) = active.into_iter().unzip();

    Some(CadenceStats {
        avg: time_weighted_average(cadence, &samples.durations),
        max: max_value(cadence),
        avg_active: time_weighted_average(&active_values, &active_durations),
        active_ratio: (total_time > 0.0).then(|| active_time / total_time),
        active_time: Some(active_time),
        cycles: Some(cycles),
        dist_per_cycle: distance
            .filter(|_| cycles > 0.0)
            .map(|distance| distance / cycles),
        slope: None,
        quartiles: quartiles(cadence),
        zones: None,
        peaks: options
            .return_peaks
            .then(|| peaks(samples.time, cadence)),
    })
}

fn compute_grade(
    samples: &Samples<'_>,
    streams: &Streams,
    velocity: Option<&[f64]>,
) -> Option<GradeStats> {
    let grade = samples.aligned(&streams.grade_smooth)?;

    let mut slope_time = SlopeStats {
        up: Some(0.0),
        flat: Some(0.0),
        down: Some(0.0),
        total: Some(0.0),
    };
    let mut slope_distance = slope_time.clone();
    for (index, (value, dt)) in grade.iter().zip(&samples.durations).enumerate() {
        let covered = velocity
            .and_then(|velocity| velocity.get(index))
            .map_or(0.0, |speed| speed * dt);
        let (time_bucket, distance_bucket) = if *value > FLAT_GRADE_THRESHOLD {
            (&mut slope_time.up, &mut slope_distance.up)
        } else if *value < -FLAT_GRADE_THRESHOLD {
            (&mut slope_time.down, &mut slope_distance.down)
        } else {
            (&mut slope_time.flat, &mut slope_distance.flat)
        };
        *time_bucket = time_bucket.map(|seconds| seconds + dt);
        *distance_bucket = distance_bucket.map(|meters| meters + covered);
    }
    slope_time.total = Some(samples.durations.iter().sum());
    slope_distance.total = velocity.map(|velocity| integrate(velocity, &samples.durations));

    let climbing_ratio = slope_time
        .total
        .filter(|total| *total > 0.0)
        .map_or(0.0, |total| {
            (slope_time.up.unwrap_or_default() + slope_time.down.unwrap_or_default()) / total
        });
    let slope_profile = if climbing_ratio > HILLY_PROFILE_RATIO {
        SlopeProfile::Hilly
    } else {
        SlopeProfile::Flat
    };

    Some(GradeStats {
        avg: time_weighted_average(grade, &samples.durations),
        max: max_value(grade),
        min: min_value(grade),
        slope_time: Some(slope_time),
        slope_distance: velocity.is_some().then_some(slope_distance),
        slope_profile: Some(slope_profile),
        quartiles: quartiles(grade),
        ..GradeStats::default()
    })
}

fn compute_elevation(altitude: &[f64]) -> ElevationStats {
    let (ascent, descent) = ascent_descent(altitude);
    ElevationStats {
        avg: time_weighted_average(altitude, &[]),
        max: max_value(altitude),
        min: min_value(altitude),
        ascent: Some(ascent),
        descent: Some(descent),
        quartiles: quartiles(altitude),
        ..ElevationStats::default()
    }
}

fn compute_stress(
    activity: &Activity,
    snapshot: &AthleteSnapshot,
    samples: &Samples<'_>,
    streams: &Streams,
    power: Option<&PowerStats>,
    elapsed_time: f64,
) -> Option<StressScores> {
    let settings = &snapshot.settings;
    let gender_factor = match snapshot.gender {
        Gender::Men => 1.92,
        Gender::Women => 1.67,
    };
    let hours = elapsed_time / 3600.0;
    let per_hour = |score: f64| (hours > 0.0).then(|| score / hours);

    let trimp_score = samples.aligned(&streams.heartrate).and_then(|heartrate| {
        trimp(
            heartrate,
            &samples.durations,
            settings.rest_hr?,
            settings.max_hr?,
            gender_factor,
        )
    });
    let hrss = trimp_score.and_then(|score| {
        let lthr = settings.lthr.default?;
        let threshold_hour = trimp(
            &[lthr; 60],
            &[60.0; 60],
            settings.rest_hr?,
            settings.max_hr?,
            gender_factor,
        )?;
        (threshold_hour > 0.0).then(|| score / threshold_hour * 100.0)
    });
    let pss = power
        .filter(|_| activity.sport().is_ride(true))
        .and_then(|power| {
            let ftp = settings.cycling_ftp.filter(|ftp| *ftp > 0.0)?;
            let np = power.weighted?;
            let intensity = power.intensity_factor?;
            Some(elapsed_time * np * intensity / (ftp * 3600.0) * 100.0)
        });

    if trimp_score.is_none() && hrss.is_none() && pss.is_none() {
        return None;
    }
    Some(StressScores {
        trimp: trimp_score,
        trimp_per_hour: trimp_score.and_then(per_hour),
        hrss,
        hrss_per_hour: hrss.and_then(per_hour),
        pss,
        pss_per_hour: pss.and_then(per_hour),
        ..StressScores::default()
    })
}
