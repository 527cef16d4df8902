//! Sleep metric engine
//!
//! Computes per-night duration, continuity, and timing metrics from the
//! segmented night table. Every metric is computed at most once per engine
//! instance and memoized; recomputation from the same night table is
//! idempotent, so repeated accessor reads return identical results.
//!
//! Per-night sequences are aligned with ascending night_date. Duration-family
//! metrics are sample counts scaled by the sampling interval, so they measure
//! anatomical elapsed time across DST transitions; timing metrics use the
//! wall-clock times of the samples.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use log::{debug, info};

use crate::bouts::keep_longest_sleep_window;
use crate::circular::{circular_mean, time_to_minutes};
use crate::error::NocturneError;
use crate::segmentation::filter_nights;
use crate::types::{NightSample, Sample, SleepConfig};

/// Fallback sampling interval when the data holds a single nocturnal sample
const DEFAULT_SAMPLING_SECS: f64 = 5.0;

/// Lazy, memoized sleep metric engine over one segmented recording
#[derive(Debug)]
pub struct SleepMetrics {
    night_data: Vec<NightSample>,
    /// (night_date, start index, end index) of each contiguous night group
    night_ranges: Vec<(NaiveDate, usize, usize)>,
    sampling_secs: f64,
    data_start_date: NaiveDate,
    weekdays: Vec<Weekday>,
    weekend: Vec<Weekday>,

    sleep_duration: Option<Vec<f64>>,
    time_in_bed: Option<Vec<f64>>,
    waso: Option<Vec<f64>>,
    sleep_efficiency: Option<Vec<f64>>,
    num_awakenings: Option<Vec<u32>>,
    waso_30: Option<f64>,
    sleep_onset: Option<Vec<Option<NaiveTime>>>,
    sleep_wakeup: Option<Vec<Option<NaiveTime>>>,
    sleep_midpoint: Option<Vec<Option<NaiveTime>>>,
    weekday_midpoint: Option<Option<NaiveTime>>,
    weekend_midpoint: Option<Option<NaiveTime>>,
    social_jetlag: Option<f64>,
}

impl SleepMetrics {
    /// Segment the recording and build the engine.
    ///
    /// Fails with `NoValidNights` when no night passes the non-wear threshold
    /// (or, with the longest-bout filter on, when no night contains sleep).
    pub fn new(samples: &[Sample], config: &SleepConfig) -> Result<Self, NocturneError> {
        config.validate()?;

        let data_start_date = samples
            .first()
            .map(|s| s.time.date())
            .ok_or(NocturneError::NoValidNights)?;

        let mut night_data = filter_nights(samples, &config.night_window, config.nw_threshold);
        if config.only_longest_sleep {
            night_data = keep_longest_sleep_window(&night_data);
        }
        if night_data.is_empty() {
            return Err(NocturneError::NoValidNights);
        }

        let night_ranges = group_by_night(&night_data);
        let sampling_secs = derive_sampling_secs(&night_data);
        info!(
            "metric engine over {} valid night(s), sampling interval {sampling_secs}s",
            night_ranges.len()
        );

        Ok(Self {
            night_data,
            night_ranges,
            sampling_secs,
            data_start_date,
            weekdays: config.weekdays.clone(),
            weekend: config.weekend.clone(),
            sleep_duration: None,
            time_in_bed: None,
            waso: None,
            sleep_efficiency: None,
            num_awakenings: None,
            waso_30: None,
            sleep_onset: None,
            sleep_wakeup: None,
            sleep_midpoint: None,
            weekday_midpoint: None,
            weekend_midpoint: None,
            social_jetlag: None,
        })
    }

    /// Unique valid night dates, ascending
    pub fn night_dates(&self) -> Vec<NaiveDate> {
        self.night_ranges.iter().map(|(d, _, _)| *d).collect()
    }

    /// Sequential 1-based night numbers, aligned with `night_dates`
    pub fn night_numbers(&self) -> Vec<u32> {
        (1..=self.night_ranges.len() as u32).collect()
    }

    /// Date of the first sample of the whole recording
    pub fn data_start_date(&self) -> NaiveDate {
        self.data_start_date
    }

    /// Seconds between consecutive samples, derived from the data
    pub fn sampling_secs(&self) -> f64 {
        self.sampling_secs
    }

    /// The segmented (and optionally bout-filtered) night table
    pub fn night_data(&self) -> &[NightSample] {
        &self.night_data
    }

    /// Total sleep per night: samples with both SIB and SPT set, in minutes
    pub fn sleep_duration(&mut self) -> Vec<f64> {
        if let Some(v) = &self.sleep_duration {
            return v.clone();
        }
        let per_minute = self.sampling_secs / 60.0;
        let v: Vec<f64> = self
            .nights()
            .map(|night| {
                night.iter().filter(|s| s.sib_periods && s.spt_periods).count() as f64 * per_minute
            })
            .collect();
        self.sleep_duration = Some(v.clone());
        v
    }

    /// Time in bed per night: samples inside the SPT window, in minutes
    pub fn time_in_bed(&mut self) -> Vec<f64> {
        if let Some(v) = &self.time_in_bed {
            return v.clone();
        }
        let per_minute = self.sampling_secs / 60.0;
        let v: Vec<f64> = self
            .nights()
            .map(|night| night.iter().filter(|s| s.spt_periods).count() as f64 * per_minute)
            .collect();
        self.time_in_bed = Some(v.clone());
        v
    }

    /// Wake after sleep onset per night: time in bed minus sleep, in minutes
    pub fn waso(&mut self) -> Vec<f64> {
        if let Some(v) = &self.waso {
            return v.clone();
        }
        let duration = self.sleep_duration();
        let in_bed = self.time_in_bed();
        let v: Vec<f64> = in_bed
            .iter()
            .zip(&duration)
            .map(|(tib, dur)| tib - dur)
            .collect();
        self.waso = Some(v.clone());
        v
    }

    /// Sleep efficiency per night as a percentage; 0.0 when time in bed is zero
    pub fn sleep_efficiency(&mut self) -> Vec<f64> {
        if let Some(v) = &self.sleep_efficiency {
            return v.clone();
        }
        let duration = self.sleep_duration();
        let in_bed = self.time_in_bed();
        let v: Vec<f64> = duration
            .iter()
            .zip(&in_bed)
            .map(|(dur, tib)| if *tib > 0.0 { dur / tib * 100.0 } else { 0.0 })
            .collect();
        self.sleep_efficiency = Some(v.clone());
        v
    }

    /// Awakenings per night: SIB transitions from sleep to wake inside the SPT window
    pub fn num_awakenings(&mut self) -> Vec<u32> {
        if let Some(v) = &self.num_awakenings {
            return v.clone();
        }
        let v: Vec<u32> = self
            .nights()
            .map(|night| {
                night
                    .iter()
                    .filter(|s| s.spt_periods)
                    .collect::<Vec<_>>()
                    .windows(2)
                    .filter(|pair| pair[0].sib_periods && !pair[1].sib_periods)
                    .count() as u32
            })
            .collect();
        self.num_awakenings = Some(v.clone());
        v
    }

    /// Fraction of nights with more than 30 minutes of WASO, scaled to a
    /// 30-day protocol
    pub fn waso_30(&mut self) -> f64 {
        if let Some(v) = self.waso_30 {
            return v;
        }
        let waso = self.waso();
        let over = waso.iter().filter(|w| **w > 30.0).count() as f64;
        let v = over / self.night_ranges.len() as f64 * 30.0;
        self.waso_30 = Some(v);
        v
    }

    /// Wall-clock time of the first SPT sample per night; None for a night
    /// without any SPT samples
    pub fn sleep_onset(&mut self) -> Vec<Option<NaiveTime>> {
        if let Some(v) = &self.sleep_onset {
            return v.clone();
        }
        let v: Vec<Option<NaiveTime>> = self
            .nights()
            .map(|night| night.iter().find(|s| s.spt_periods).map(|s| s.time.time()))
            .collect();
        self.sleep_onset = Some(v.clone());
        v
    }

    /// Wall-clock time of the last SPT sample per night
    pub fn sleep_wakeup(&mut self) -> Vec<Option<NaiveTime>> {
        if let Some(v) = &self.sleep_wakeup {
            return v.clone();
        }
        let v: Vec<Option<NaiveTime>> = self
            .nights()
            .map(|night| {
                night
                    .iter()
                    .rev()
                    .find(|s| s.spt_periods)
                    .map(|s| s.time.time())
            })
            .collect();
        self.sleep_wakeup = Some(v.clone());
        v
    }

    /// Arithmetic midpoint of onset and wakeup per night
    pub fn sleep_midpoint(&mut self) -> Vec<Option<NaiveTime>> {
        if let Some(v) = &self.sleep_midpoint {
            return v.clone();
        }
        let onset = self.sleep_onset();
        let wakeup = self.sleep_wakeup();
        let v: Vec<Option<NaiveTime>> = onset
            .iter()
            .zip(&wakeup)
            .map(|(start, end)| match (start, end) {
                (Some(start), Some(end)) => Some(night_midpoint(*start, *end)),
                _ => None,
            })
            .collect();
        self.sleep_midpoint = Some(v.clone());
        v
    }

    /// Circular mean of sleep midpoints over configured weekdays; None when no
    /// valid night falls on a weekday
    pub fn weekday_midpoint(&mut self) -> Option<NaiveTime> {
        if let Some(v) = self.weekday_midpoint {
            return v;
        }
        let days = self.weekdays.clone();
        let v = self.midpoint_aggregate(&days);
        self.weekday_midpoint = Some(v);
        v
    }

    /// Circular mean of sleep midpoints over configured weekend days
    pub fn weekend_midpoint(&mut self) -> Option<NaiveTime> {
        if let Some(v) = self.weekend_midpoint {
            return v;
        }
        let days = self.weekend.clone();
        let v = self.midpoint_aggregate(&days);
        self.weekend_midpoint = Some(v);
        v
    }

    /// Minimal circular difference between weekend and weekday midpoints, in
    /// minutes; NaN when either day-set matches no nights
    pub fn social_jetlag(&mut self) -> f64 {
        if let Some(v) = self.social_jetlag {
            return v;
        }
        let v = match (self.weekday_midpoint(), self.weekend_midpoint()) {
            (Some(weekday), Some(weekend)) => {
                let diff = (time_to_minutes(weekend) - time_to_minutes(weekday)).abs();
                diff.min(1440.0 - diff)
            }
            _ => {
                debug!("social jetlag unavailable: empty weekday or weekend night set");
                f64::NAN
            }
        };
        self.social_jetlag = Some(v);
        v
    }

    fn midpoint_aggregate(&mut self, days: &[Weekday]) -> Option<NaiveTime> {
        let midpoints = self.sleep_midpoint();
        let times: Vec<NaiveTime> = self
            .night_ranges
            .iter()
            .zip(&midpoints)
            .filter(|((date, _, _), _)| days.contains(&date.weekday()))
            .filter_map(|(_, midpoint)| *midpoint)
            .collect();
        circular_mean(&times).ok()
    }

    fn nights(&self) -> impl Iterator<Item = &[NightSample]> + '_ {
        self.night_ranges
            .iter()
            .map(|(_, start, end)| &self.night_data[*start..*end])
    }
}

/// Arithmetic midpoint of two clock times, where an end earlier than the start
/// means the interval crosses midnight.
pub fn night_midpoint(start: NaiveTime, end: NaiveTime) -> NaiveTime {
    let start_secs = i64::from(start.num_seconds_from_midnight());
    let mut end_secs = i64::from(end.num_seconds_from_midnight());
    if end_secs < start_secs {
        end_secs += 86_400;
    }
    let midpoint = ((start_secs + end_secs) / 2) % 86_400;
    NaiveTime::from_num_seconds_from_midnight_opt(midpoint as u32, 0).unwrap_or_default()
}

/// Contiguous (night_date, start, end) index ranges of a sorted night table.
/// Night occurrences do not overlap, so groups are contiguous runs.
fn group_by_night(night_data: &[NightSample]) -> Vec<(NaiveDate, usize, usize)> {
    let mut out = Vec::new();
    let mut start = 0;
    for i in 1..=night_data.len() {
        if i == night_data.len() || night_data[i].night_date != night_data[start].night_date {
            out.push((night_data[start].night_date, start, i));
            start = i;
        }
    }
    out
}

/// Median gap between consecutive samples, in seconds
fn derive_sampling_secs(night_data: &[NightSample]) -> f64 {
    let mut deltas: Vec<i64> = night_data
        .windows(2)
        .map(|pair| (pair[1].time - pair[0].time).num_milliseconds())
        .filter(|ms| *ms > 0)
        .collect();
    if deltas.is_empty() {
        return DEFAULT_SAMPLING_SECS;
    }
    deltas.sort_unstable();
    deltas[deltas.len() / 2] as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, TimeDelta};
    use pretty_assertions::assert_eq;

    /// Minute samples covering `days` full days from 2024-05-02 (a Thursday)
    /// at 12:00, with per-sample SIB flags supplied by the caller.
    fn recording(days: usize, sib: impl Fn(usize) -> bool) -> Vec<Sample> {
        let start: NaiveDateTime = "2024-05-02T12:00:00".parse().unwrap();
        (0..days * 1440)
            .map(|i| Sample {
                time: start + TimeDelta::minutes(i as i64),
                sleep_status: sib(i),
                sib_periods: sib(i),
                spt_periods: true,
                nonwear_status: false,
            })
            .collect()
    }

    fn engine(samples: &[Sample]) -> SleepMetrics {
        SleepMetrics::new(samples, &SleepConfig::new("us_eastern")).unwrap()
    }

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_full_night_of_sleep() {
        let mut metrics = engine(&recording(1, |_| true));

        assert_eq!(metrics.sleep_duration(), vec![720.0]);
        assert_eq!(metrics.time_in_bed(), vec![720.0]);
        assert_eq!(metrics.waso(), vec![0.0]);
        assert_eq!(metrics.sleep_efficiency(), vec![100.0]);
        assert_eq!(metrics.num_awakenings(), vec![0]);
        assert_eq!(metrics.waso_30(), 0.0);
    }

    #[test]
    fn test_onset_wakeup_midpoint() {
        let mut metrics = engine(&recording(1, |_| true));

        assert_eq!(metrics.sleep_onset(), vec![Some(t(20, 0, 0))]);
        assert_eq!(metrics.sleep_wakeup(), vec![Some(t(7, 59, 0))]);
        assert_eq!(metrics.sleep_midpoint(), vec![Some(t(1, 59, 30))]);
    }

    #[test]
    fn test_awakenings_and_waso_30() {
        // Two separate SIB gaps inside the night window. The window covers
        // minutes 480..1200 of the recording (20:00 through 08:00).
        let mut metrics = engine(&recording(1, |i| {
            !(700..800).contains(&i) && !(900..1000).contains(&i)
        }));

        assert_eq!(metrics.num_awakenings(), vec![2]);
        assert_eq!(metrics.waso(), vec![200.0]);
        // 1 of 1 nights has waso > 30 minutes
        assert_eq!(metrics.waso_30(), 30.0);
    }

    #[test]
    fn test_night_numbering_is_sequential() {
        let metrics = engine(&recording(3, |_| true));

        assert_eq!(metrics.night_numbers(), vec![1, 2, 3]);
        let dates = metrics.night_dates();
        assert_eq!(dates.first().unwrap().to_string(), "2024-05-02");
        assert_eq!(dates.last().unwrap().to_string(), "2024-05-04");
    }

    #[test]
    fn test_weekday_weekend_midpoints() {
        // Thu, Fri, Sat nights; identical schedules, so both aggregates equal
        // the per-night midpoint and the jetlag is zero.
        let mut metrics = engine(&recording(3, |_| true));

        assert_eq!(metrics.weekday_midpoint(), Some(t(1, 59, 30)));
        assert_eq!(metrics.weekend_midpoint(), Some(t(1, 59, 30)));
        assert_eq!(metrics.social_jetlag(), 0.0);
    }

    #[test]
    fn test_social_jetlag_without_weekend_nights() {
        // Thu and Fri nights only
        let mut metrics = engine(&recording(2, |_| true));

        assert!(metrics.weekday_midpoint().is_some());
        assert_eq!(metrics.weekend_midpoint(), None);
        assert!(metrics.social_jetlag().is_nan());
    }

    #[test]
    fn test_no_valid_nights_errors() {
        let start: NaiveDateTime = "2024-05-02T10:00:00".parse().unwrap();
        let samples: Vec<Sample> = (0..100)
            .map(|i| Sample {
                time: start + TimeDelta::minutes(i),
                sleep_status: true,
                sib_periods: true,
                spt_periods: true,
                nonwear_status: false,
            })
            .collect();

        let err = SleepMetrics::new(&samples, &SleepConfig::new("us_eastern")).unwrap_err();
        assert!(matches!(err, NocturneError::NoValidNights));
    }

    #[test]
    fn test_longest_bout_config() {
        let mut config = SleepConfig::new("us_eastern");
        config.only_longest_sleep = true;
        // 500-sample and 120-sample sleep runs inside the window
        let samples = recording(1, |i| (500..1000).contains(&i) || (1050..1170).contains(&i));
        let mut metrics = SleepMetrics::new(&samples, &config).unwrap();

        assert_eq!(metrics.night_data().len(), 500);
        assert!(metrics.night_data().iter().all(|s| s.sleep_status));
        assert_eq!(metrics.sleep_duration(), vec![500.0]);
    }

    #[test]
    fn test_accessors_are_idempotent() {
        let mut metrics = engine(&recording(2, |i| i % 7 != 0));

        let first = metrics.sleep_efficiency();
        let second = metrics.sleep_efficiency();
        assert_eq!(first, second);
        assert_eq!(metrics.waso_30(), metrics.waso_30());
    }

    #[test]
    fn test_midpoint_arithmetic() {
        assert_eq!(night_midpoint(t(22, 0, 0), t(6, 10, 0)), t(2, 5, 0));
        assert_eq!(night_midpoint(t(1, 0, 0), t(5, 0, 0)), t(3, 0, 0));
        assert_eq!(night_midpoint(t(23, 0, 0), t(1, 0, 0)), t(0, 0, 0));
    }

    #[test]
    fn test_sampling_interval_derived_from_data() {
        let start: NaiveDateTime = "2024-05-02T12:00:00".parse().unwrap();
        let samples: Vec<Sample> = (0..17_280)
            .map(|i| Sample {
                time: start + TimeDelta::seconds(i * 5),
                sleep_status: true,
                sib_periods: true,
                spt_periods: true,
                nonwear_status: false,
            })
            .collect();

        let metrics = engine(&samples);
        assert_eq!(metrics.sampling_secs(), 5.0);
    }
}
