// ABOUTME: Pure statistics over sample-aligned activity streams
// ABOUTME: Time-weighted averages, quartiles, best-window peaks, normalized power, TRIMP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Every function takes the sample times (seconds since start) and one
//! stream of the same length. Streams whose length differs from `time` are
//! treated as absent by the caller.

use pierre_core::constants::stats::PEAK_RANGES_SECONDS;
use pierre_core::models::{Peak, Quartiles, ZoneStats};
use rayon::prelude::*;

/// Rolling window used by normalized power (s)
const NORMALIZED_POWER_WINDOW_SECONDS: f64 = 30.0;

/// Per-sample durations: `dt[0] = 0`, `dt[i] = time[i] - time[i - 1]`
#[must_use]
pub fn sample_durations(time: &[f64]) -> Vec<f64> {
    let mut durations = Vec::with_capacity(time.len());
    let mut previous = time.first().copied().unwrap_or_default();
    for &t in time {
        durations.push((t - previous).max(0.0));
        previous = t;
    }
    durations
}

/// Average weighted by sample durations, falling back to the plain mean
#[must_use]
pub fn time_weighted_average(values: &[f64], durations: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let total: f64 = durations.iter().sum();
    if total > 0.0 && durations.len() == values.len() {
        let weighted: f64 = values.iter().zip(durations).map(|(v, dt)| v * dt).sum();
        Some(weighted / total)
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Largest value
#[must_use]
pub fn max_value(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Smallest value
#[must_use]
pub fn min_value(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Lower quartile, median, upper quartile and population standard deviation
#[must_use]
pub fn quartiles(values: &[f64]) -> Quartiles {
    if values.is_empty() {
        return Quartiles::default();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
    let variance =
        sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / sorted.len() as f64;

    Quartiles {
        low_q: Some(percentile(&sorted, 0.25)),
        median: Some(percentile(&sorted, 0.5)),
        upper_q: Some(percentile(&sorted, 0.75)),
        std_dev: Some(variance.sqrt()),
    }
}

/// Linear interpolation percentile over an ascending slice
fn percentile(sorted: &[f64], rank: f64) -> f64 {
    let position = rank * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    match (sorted.get(lower), sorted.get(upper)) {
        (Some(low), Some(high)) => low + (high - low) * (position - lower as f64),
        (Some(low), None) => *low,
        _ => 0.0,
    }
}

/// Prefix sums of `value * dt`
fn weighted_prefix(values: &[f64], durations: &[f64]) -> Vec<f64> {
    let mut prefix = Vec::with_capacity(values.len());
    let mut acc = 0.0;
    for (value, dt) in values.iter().zip(durations) {
        acc += value * dt;
        prefix.push(acc);
    }
    prefix
}

/// Best time-weighted average over any window lasting at least `range` seconds
///
/// Returns `None` when the recording is shorter than `range`.
#[must_use]
pub fn best_window_average(time: &[f64], values: &[f64], range: f64) -> Option<f64> {
    if time.len() != values.len() || time.len() < 2 {
        return None;
    }
    let durations = sample_durations(time);
    let prefix = weighted_prefix(values, &durations);

    let mut best: Option<f64> = None;
    let mut start = 0;
    for end in 1..time.len() {
        // Shrink the window from the left while it still spans `range`
        while start + 1 < end && time[end] - time[start + 1] >= range {
            start += 1;
        }
        let span = time[end] - time[start];
        if span >= range && span > 0.0 {
            let average = (prefix[end] - prefix[start]) / span;
            best = Some(best.map_or(average, |current| current.max(average)));
        }
    }
    best
}

/// Peaks over the standard window ranges, in ascending range order
#[must_use]
pub fn peaks(time: &[f64], values: &[f64]) -> Vec<Peak> {
    PEAK_RANGES_SECONDS
        .par_iter()
        .filter_map(|&range| {
            best_window_average(time, values, f64::from(range))
                .map(|result| Peak { range, result })
        })
        .collect()
}

/// Normalized power: fourth-root mean of the 30s rolling average to the fourth
#[must_use]
pub fn normalized_power(time: &[f64], watts: &[f64]) -> Option<f64> {
    if time.len() != watts.len() || time.len() < 2 {
        return None;
    }
    let durations = sample_durations(time);
    let prefix = weighted_prefix(watts, &durations);

    let mut start = 0;
    let mut sum_fourth = 0.0;
    let mut weight = 0.0;
    for end in 1..time.len() {
        while start + 1 < end && time[end] - time[start + 1] >= NORMALIZED_POWER_WINDOW_SECONDS {
            start += 1;
        }
        let span = time[end] - time[start];
        if span >= NORMALIZED_POWER_WINDOW_SECONDS {
            let rolling = (prefix[end] - prefix[start]) / span;
            sum_fourth += rolling.powi(4) * durations[end];
            weight += durations[end];
        }
    }
    (weight > 0.0).then(|| (sum_fourth / weight).powf(0.25))
}

/// Sum of `value * dt`
#[must_use]
pub fn integrate(values: &[f64], durations: &[f64]) -> f64 {
    values.iter().zip(durations).map(|(v, dt)| v * dt).sum()
}

/// Cumulated positive and negative altitude differences as `(ascent, descent)`
#[must_use]
pub fn ascent_descent(altitude: &[f64]) -> (f64, f64) {
    altitude
        .windows(2)
        .fold((0.0, 0.0), |(ascent, descent), pair| {
            let delta = pair[1] - pair[0];
            if delta > 0.0 {
                (ascent + delta, descent)
            } else {
                (ascent, descent - delta)
            }
        })
}

/// Banister TRIMP over a heart rate stream
///
/// `gender_factor` is 1.92 for men and 1.67 for women.
#[must_use]
pub fn trimp(
    heartrate: &[f64],
    durations: &[f64],
    rest_hr: f64,
    max_hr: f64,
    gender_factor: f64,
) -> Option<f64> {
    let reserve = max_hr - rest_hr;
    if heartrate.is_empty() || reserve <= 0.0 {
        return None;
    }
    let score = heartrate
        .iter()
        .zip(durations)
        .map(|(hr, dt)| {
            let ratio = ((hr - rest_hr) / reserve).clamp(0.0, 1.0);
            dt / 60.0 * ratio * 0.64 * (gender_factor * ratio).exp()
        })
        .sum();
    Some(score)
}

/// Seconds spent between consecutive `bounds`
#[must_use]
pub fn time_in_zones(values: &[f64], durations: &[f64], bounds: &[f64]) -> Vec<ZoneStats> {
    bounds
        .windows(2)
        .map(|zone| {
            let seconds = values
                .par_iter()
                .zip(durations.par_iter())
                .filter(|(value, _)| **value >= zone[0] && **value < zone[1])
                .map(|(_, dt)| *dt)
                .sum();
            ZoneStats {
                from: zone[0],
                to: zone[1],
                seconds: Some(seconds),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn seconds(count: usize) -> Vec<f64> {
        (0..count).map(|i| i as f64).collect()
    }

    #[test]
    fn test_best_window_average_finds_hardest_block() {
        let time = seconds(61);
        let mut watts = vec![100.0; 61];
        for w in &mut watts[21..=30] {
            *w = 400.0;
        }
        let best = best_window_average(&time, &watts, 10.0).unwrap();
        assert!((best - 400.0).abs() < 1e-9);
        assert!(best_window_average(&time, &watts, 120.0).is_none());
    }

    #[test]
    fn test_peaks_are_ordered_by_range() {
        let time = seconds(700);
        let watts = vec![200.0; 700];
        let ranges: Vec<u32> = peaks(&time, &watts).iter().map(|p| p.range).collect();
        assert_eq!(ranges, vec![5, 10, 20, 30, 60, 120, 300, 600]);
    }

    #[test]
    fn test_constant_power_normalizes_to_itself() {
        let time = seconds(120);
        let watts = vec![250.0; 120];
        let np = normalized_power(&time, &watts).unwrap();
        assert!((np - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_quartiles_of_small_sample() {
        let q = quartiles(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(q.median, Some(3.0));
        assert_eq!(q.low_q, Some(2.0));
        assert_eq!(q.upper_q, Some(4.0));
    }

    #[test]
    fn test_ascent_descent() {
        let (ascent, descent) = ascent_descent(&[100.0, 110.0, 105.0, 120.0]);
        assert!((ascent - 25.0).abs() < 1e-9);
        assert!((descent - 5.0).abs() < 1e-9);
    }
}
