//! Longest-bout extraction
//!
//! Optional post-filter that keeps, within each night, only the samples of the
//! single longest contiguous run of sleep.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::NightSample;

/// Keep only the longest continuous sleep bout per night.
///
/// Candidate bouts are delimited by awake-to-sleep transitions and by
/// night_date changes; the date guard prevents two separate nights' runs from
/// merging when the intervening awake or non-wear samples were filtered out
/// during segmentation. Per night the bout with the maximum sample count wins,
/// last among equals. Only samples with `sleep_status == true` from the
/// winning bout survive; nights without any sleep samples contribute nothing.
pub fn keep_longest_sleep_window(night_data: &[NightSample]) -> Vec<NightSample> {
    let mut bout_ids = Vec::with_capacity(night_data.len());
    let mut bout_id: u64 = 0;

    for (i, sample) in night_data.iter().enumerate() {
        if i > 0 {
            let prev = &night_data[i - 1];
            let new_night = sample.night_date != prev.night_date;
            let fell_asleep = sample.sleep_status && !prev.sleep_status;
            if new_night || fell_asleep {
                bout_id += 1;
            }
        }
        bout_ids.push(bout_id);
    }

    let mut bout_lengths: BTreeMap<(NaiveDate, u64), usize> = BTreeMap::new();
    for (sample, id) in night_data.iter().zip(&bout_ids) {
        if sample.sleep_status {
            *bout_lengths.entry((sample.night_date, *id)).or_insert(0) += 1;
        }
    }

    // Longest bout per night; >= keeps the last among equal lengths since
    // bout ids iterate in ascending order within a night.
    let mut longest: BTreeMap<NaiveDate, (u64, usize)> = BTreeMap::new();
    for ((date, id), len) in &bout_lengths {
        match longest.get(date) {
            Some((_, best)) if len < best => {}
            _ => {
                longest.insert(*date, (*id, *len));
            }
        }
    }

    night_data
        .iter()
        .zip(&bout_ids)
        .filter(|(sample, id)| {
            sample.sleep_status
                && longest
                    .get(&sample.night_date)
                    .is_some_and(|(best_id, _)| best_id == *id)
        })
        .map(|(sample, _)| *sample)
        .collect()
}
