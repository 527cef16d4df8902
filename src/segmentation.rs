//! Night segmentation
//!
//! Partitions the continuous sample series into discrete nights under the
//! configured nocturnal window, computes per-night non-wear fractions, and
//! keeps only the nights at or below the non-wear threshold.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use log::debug;

use crate::types::{NightSample, NightWindow, Sample};

/// Per-night wear statistics collected during segmentation
#[derive(Debug, Clone, Copy, Default)]
struct NightStats {
    non_wear_count: usize,
    total_count: usize,
}

impl NightStats {
    fn non_wear_fraction(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.non_wear_count as f64 / self.total_count as f64
    }
}

/// Filter the sample series down to the samples belonging to valid nights.
///
/// A night is one occurrence of the nocturnal window, keyed by the calendar
/// date on which the window starts. For a midnight-crossing window the
/// early-morning tail is keyed to the previous date, grouping the evening
/// start and next-morning end of the same sleep opportunity under one key.
/// A night is valid when its non-wear fraction is at or below `nw_threshold`.
///
/// Returns the retained samples sorted by timestamp ascending; the result is
/// empty when no night passes the threshold.
pub fn filter_nights(
    samples: &[Sample],
    window: &NightWindow,
    nw_threshold: f64,
) -> Vec<NightSample> {
    let mut nocturnal: Vec<NightSample> = Vec::new();

    for sample in samples {
        let time_of_day = sample.time.time();
        if !window.contains(time_of_day) {
            continue;
        }
        let night_date = assign_night_date(sample, window);
        nocturnal.push(NightSample::new(sample, night_date));
    }

    nocturnal.sort_by_key(|s| s.time);

    let mut stats: BTreeMap<NaiveDate, NightStats> = BTreeMap::new();
    for sample in &nocturnal {
        let entry = stats.entry(sample.night_date).or_default();
        entry.total_count += 1;
        if sample.nonwear_status {
            entry.non_wear_count += 1;
        }
    }

    // Threshold is inclusive: a night exactly at the threshold is valid.
    let valid: BTreeMap<NaiveDate, NightStats> = stats
        .into_iter()
        .filter(|(_, s)| s.non_wear_fraction() <= nw_threshold)
        .collect();

    debug!(
        "night segmentation retained {} valid night(s) from {} nocturnal sample(s)",
        valid.len(),
        nocturnal.len()
    );

    nocturnal
        .into_iter()
        .filter(|s| valid.contains_key(&s.night_date))
        .collect()
}

/// The calendar date keying the night a sample belongs to
fn assign_night_date(sample: &Sample, window: &NightWindow) -> NaiveDate {
    let date = sample.time.date();
    if window.crosses_midnight() && sample.time.time() < window.start() {
        // Early-morning tail of the previous evening's window
        date.checked_sub_days(Days::new(1)).unwrap_or(date)
    } else {
        date
    }
}

/// Unique night dates of a segmented series, in chronological order.
///
/// Segmented samples are sorted by time and night occurrences do not overlap,
/// so first-appearance order is chronological.
pub fn unique_night_dates(night_data: &[NightSample]) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for sample in night_data {
        if dates.last() != Some(&sample.night_date) {
            dates.push(sample.night_date);
        }
    }
    dates
}
