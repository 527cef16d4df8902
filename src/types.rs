//! Core types for the Nocturne pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: input samples, the nocturnal window configuration, segmented night
//! samples, and the metric name/category enums used for dispatch.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::NocturneError;

/// One row of processed actigraphy input.
///
/// `time` is the wall-clock local instant of the sample. Rows are ordered by
/// time, one per fixed sampling interval (commonly 5 seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Wall-clock timestamp of the sample
    pub time: NaiveDateTime,
    /// Device-classified sleep/wake state
    pub sleep_status: bool,
    /// Sustained-inactivity-bout flag
    pub sib_periods: bool,
    /// Sleep-period-time window flag
    pub spt_periods: bool,
    /// Device-detected non-wear flag
    pub nonwear_status: bool,
}

/// A sample tagged with the calendar date of the night it belongs to.
///
/// For a midnight-crossing window the early-morning tail is keyed to the date
/// on which the window started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NightSample {
    pub time: NaiveDateTime,
    pub sleep_status: bool,
    pub sib_periods: bool,
    pub spt_periods: bool,
    pub nonwear_status: bool,
    pub night_date: NaiveDate,
}

impl NightSample {
    pub fn new(sample: &Sample, night_date: NaiveDate) -> Self {
        Self {
            time: sample.time,
            sleep_status: sample.sleep_status,
            sib_periods: sample.sib_periods,
            spt_periods: sample.spt_periods,
            nonwear_status: sample.nonwear_status,
            night_date,
        }
    }
}

/// The user-configured nocturnal interval.
///
/// If `start > end` the window crosses midnight and each occurrence spans two
/// calendar dates. Membership is half-open: `start <= t < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl NightWindow {
    /// Create a night window. `start == end` is rejected as degenerate.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, NocturneError> {
        if start == end {
            return Err(NocturneError::InvalidNightWindow(format!(
                "night_start and night_end are both {start}; the window must be a proper interval"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether the window spans midnight (start later than end)
    pub fn crosses_midnight(&self) -> bool {
        self.start > self.end
    }

    /// Whether a time-of-day falls inside the window
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.crosses_midnight() {
            t >= self.start || t < self.end
        } else {
            t >= self.start && t < self.end
        }
    }
}

impl Default for NightWindow {
    /// The default nocturnal interval, 20:00 to 08:00
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
        }
    }
}

/// High-level metric categories selectable by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    SleepDuration,
    SleepContinuity,
    SleepTiming,
}

impl MetricCategory {
    /// All categories, in reporting order
    pub const ALL: [MetricCategory; 3] = [
        MetricCategory::SleepDuration,
        MetricCategory::SleepContinuity,
        MetricCategory::SleepTiming,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricCategory::SleepDuration => "sleep_duration",
            MetricCategory::SleepContinuity => "sleep_continuity",
            MetricCategory::SleepTiming => "sleep_timing",
        }
    }

    /// The concrete metrics belonging to this category
    pub fn metrics(&self) -> &'static [SleepMetric] {
        match self {
            MetricCategory::SleepDuration => {
                &[SleepMetric::SleepDuration, SleepMetric::TimeInBed]
            }
            MetricCategory::SleepContinuity => &[
                SleepMetric::Waso,
                SleepMetric::SleepEfficiency,
                SleepMetric::NumAwakenings,
                SleepMetric::Waso30,
            ],
            MetricCategory::SleepTiming => &[
                SleepMetric::SleepOnset,
                SleepMetric::SleepWakeup,
                SleepMetric::SleepMidpoint,
                SleepMetric::WeekdayMidpoint,
                SleepMetric::WeekendMidpoint,
                SleepMetric::SocialJetlag,
            ],
        }
    }
}

impl std::str::FromStr for MetricCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sleep_duration" => Ok(MetricCategory::SleepDuration),
            "sleep_continuity" => Ok(MetricCategory::SleepContinuity),
            "sleep_timing" => Ok(MetricCategory::SleepTiming),
            other => Err(format!(
                "Unknown metric category: {other}. Expected one of \
                 sleep_duration, sleep_continuity, sleep_timing"
            )),
        }
    }
}

/// Concrete metric kinds computed by the metric engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepMetric {
    SleepDuration,
    TimeInBed,
    Waso,
    SleepEfficiency,
    NumAwakenings,
    Waso30,
    SleepOnset,
    SleepWakeup,
    SleepMidpoint,
    WeekdayMidpoint,
    WeekendMidpoint,
    SocialJetlag,
}

impl SleepMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            SleepMetric::SleepDuration => "sleep_duration",
            SleepMetric::TimeInBed => "time_in_bed",
            SleepMetric::Waso => "waso",
            SleepMetric::SleepEfficiency => "sleep_efficiency",
            SleepMetric::NumAwakenings => "num_awakenings",
            SleepMetric::Waso30 => "waso_30",
            SleepMetric::SleepOnset => "sleep_onset",
            SleepMetric::SleepWakeup => "sleep_wakeup",
            SleepMetric::SleepMidpoint => "sleep_midpoint",
            SleepMetric::WeekdayMidpoint => "weekday_midpoint",
            SleepMetric::WeekendMidpoint => "weekend_midpoint",
            SleepMetric::SocialJetlag => "social_jetlag",
        }
    }
}

/// Configuration surface consumed by the core pipeline
#[derive(Debug, Clone)]
pub struct SleepConfig {
    /// Nocturnal interval used for night segmentation
    pub night_window: NightWindow,
    /// Non-wear fraction at or below which a night is valid
    pub nw_threshold: f64,
    /// Timezone of the recording, a friendly region key or IANA identifier
    pub timezone: String,
    /// Metric categories to compute
    pub categories: Vec<MetricCategory>,
    /// Days counted as weekdays for the weekday midpoint aggregate
    pub weekdays: Vec<Weekday>,
    /// Days counted as weekend for the weekend midpoint aggregate
    pub weekend: Vec<Weekday>,
    /// Keep only the longest contiguous sleep bout per night
    pub only_longest_sleep: bool,
}

impl SleepConfig {
    /// Create a configuration for the given timezone with defaults everywhere
    /// else: 20:00-08:00 window, 0.2 non-wear threshold, all categories,
    /// Mon-Fri weekdays and Sat-Sun weekend.
    pub fn new(timezone: impl Into<String>) -> Self {
        Self {
            night_window: NightWindow::default(),
            nw_threshold: 0.2,
            timezone: timezone.into(),
            categories: MetricCategory::ALL.to_vec(),
            weekdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            weekend: vec![Weekday::Sat, Weekday::Sun],
            only_longest_sleep: false,
        }
    }

    /// Validate value ranges that cannot be enforced structurally
    pub fn validate(&self) -> Result<(), NocturneError> {
        if !(0.0..=1.0).contains(&self.nw_threshold) {
            return Err(NocturneError::InvalidThreshold(self.nw_threshold));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_window_non_crossing_contains() {
        let window = NightWindow::new(t(20, 0), t(23, 0)).unwrap();
        assert!(!window.crosses_midnight());
        assert!(window.contains(t(20, 0)));
        assert!(window.contains(t(22, 59)));
        assert!(!window.contains(t(23, 0)));
        assert!(!window.contains(t(2, 0)));
    }

    #[test]
    fn test_window_crossing_contains() {
        let window = NightWindow::new(t(20, 0), t(8, 0)).unwrap();
        assert!(window.crosses_midnight());
        assert!(window.contains(t(20, 0)));
        assert!(window.contains(t(23, 59)));
        assert!(window.contains(t(0, 0)));
        assert!(window.contains(t(7, 59)));
        assert!(!window.contains(t(8, 0)));
        assert!(!window.contains(t(12, 0)));
    }

    #[test]
    fn test_degenerate_window_rejected() {
        let err = NightWindow::new(t(20, 0), t(20, 0)).unwrap_err();
        assert!(matches!(err, NocturneError::InvalidNightWindow(_)));
    }

    #[test]
    fn test_category_metric_table() {
        assert_eq!(MetricCategory::SleepDuration.metrics().len(), 2);
        assert_eq!(MetricCategory::SleepContinuity.metrics().len(), 4);
        assert_eq!(MetricCategory::SleepTiming.metrics().len(), 6);

        let all: Vec<&str> = MetricCategory::ALL
            .iter()
            .flat_map(|c| c.metrics())
            .map(|m| m.as_str())
            .collect();
        assert_eq!(all.len(), 12);
        assert!(all.contains(&"waso_30"));
        assert!(all.contains(&"social_jetlag"));
    }

    #[test]
    fn test_config_threshold_validation() {
        let mut config = SleepConfig::new("us_eastern");
        assert!(config.validate().is_ok());

        config.nw_threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(NocturneError::InvalidThreshold(_))
        ));
    }
}
