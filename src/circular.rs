//! Circular time statistics
//!
//! Mean and standard deviation of clock times computed on the unit circle, so
//! that times near midnight average correctly (the mean of 23:30 and 00:30 is
//! 00:00, not 12:00). Also hosts the ordinary mean/std helpers used for
//! summary statistics over plain numeric sequences.

use chrono::{NaiveTime, Timelike};

use crate::error::NocturneError;

/// Radians per minute-of-day
const RADIANS_PER_MINUTE: f64 = 2.0 * std::f64::consts::PI / 1440.0;

/// Resultant lengths below this are treated as a uniform spread around the clock
const UNIFORMITY_EPSILON: f64 = 1e-10;

/// Convert a time-of-day to fractional minutes since midnight
pub fn time_to_minutes(t: NaiveTime) -> f64 {
    t.hour() as f64 * 60.0 + t.minute() as f64 + t.second() as f64 / 60.0
}

/// Convert minutes since midnight back to a time-of-day, truncated to whole
/// seconds and wrapped modulo 24h.
pub fn minutes_to_time(minutes: f64) -> NaiveTime {
    // Snap away sub-microsecond float noise so truncation is stable when the
    // atan2 round-trip lands a hair below a whole second.
    let minutes = (minutes * 1e6).round() / 1e6;
    let minutes = minutes.rem_euclid(1440.0);
    let hours = (minutes / 60.0) as u32;
    let mins = (minutes % 60.0) as u32;
    let secs = ((minutes % 1.0) * 60.0) as u32;
    NaiveTime::from_hms_opt(hours, mins, secs).unwrap_or_default()
}

/// Circular mean of a set of clock times.
///
/// Each time is mapped to an angle on the 24h circle, the resultant of the
/// unit vectors is taken, and the resultant angle is mapped back to a
/// time-of-day.
pub fn circular_mean(times: &[NaiveTime]) -> Result<NaiveTime, NocturneError> {
    if times.is_empty() {
        return Err(NocturneError::EmptyTimeSeries);
    }

    let (sin_sum, cos_sum) = vector_sums(times);
    let mean_angle = sin_sum.atan2(cos_sum);

    let mut mean_minutes = mean_angle / RADIANS_PER_MINUTE;
    if mean_minutes < 0.0 {
        mean_minutes += 1440.0;
    }

    Ok(minutes_to_time(mean_minutes))
}

/// Circular standard deviation of a set of clock times, in minutes.
///
/// A numerically vanishing resultant length means the times are uniformly
/// spread around the clock; the deviation is then positive infinity rather
/// than an error.
pub fn circular_std_dev(times: &[NaiveTime]) -> Result<f64, NocturneError> {
    if times.is_empty() {
        return Err(NocturneError::EmptyTimeSeries);
    }

    let (sin_sum, cos_sum) = vector_sums(times);
    let r = (sin_sum.powi(2) + cos_sum.powi(2)).sqrt() / times.len() as f64;

    if r < UNIFORMITY_EPSILON {
        return Ok(f64::INFINITY);
    }

    Ok((-2.0 * r.ln()).max(0.0).sqrt() / RADIANS_PER_MINUTE)
}

fn vector_sums(times: &[NaiveTime]) -> (f64, f64) {
    times
        .iter()
        .map(|t| time_to_minutes(*t) * RADIANS_PER_MINUTE)
        .fold((0.0, 0.0), |(s, c), angle| {
            (s + angle.sin(), c + angle.cos())
        })
}

/// Ordinary arithmetic mean
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Ordinary population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
