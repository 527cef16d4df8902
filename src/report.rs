//! Result assembly
//!
//! Maps requested metric categories to concrete metrics, drives the metric
//! engine, and packages night metadata, metric values, and cross-night summary
//! statistics into the export document. Time values render as `HH:MM:SS`
//! strings; unavailable values render as JSON null.

use chrono::{NaiveDate, NaiveTime};
use serde_json::{json, Map, Value};

use crate::circular::{circular_mean, circular_std_dev, mean, std_dev};
use crate::error::NocturneError;
use crate::metrics::SleepMetrics;
use crate::types::{MetricCategory, SleepMetric};

/// A computed metric in one of the engine's value shapes
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// One number per night, aligned with night order
    PerNight(Vec<f64>),
    /// One clock time per night; None when the night had no SPT samples
    PerNightTimes(Vec<Option<NaiveTime>>),
    /// A single cross-night number; NaN means unavailable
    Scalar(f64),
    /// A single cross-night clock time; None means unavailable
    ScalarTime(Option<NaiveTime>),
}

/// Assembled metrics and night metadata ready for export
#[derive(Debug, Clone)]
pub struct SleepReport {
    pub night_dates: Vec<NaiveDate>,
    pub night_numbers: Vec<u32>,
    pub metrics: Vec<(SleepMetric, MetricValue)>,
}

impl SleepReport {
    /// Compute every metric of the requested categories through the engine
    pub fn build(engine: &mut SleepMetrics, categories: &[MetricCategory]) -> Self {
        let metrics = categories
            .iter()
            .flat_map(|c| c.metrics())
            .map(|metric| (*metric, metric_value(engine, *metric)))
            .collect();

        Self {
            night_dates: engine.night_dates(),
            night_numbers: engine.night_numbers(),
            metrics,
        }
    }

    /// Render the full export document
    pub fn to_json(&self) -> Value {
        let mut metric_map = Map::new();
        let mut summary_map = Map::new();

        for (metric, value) in &self.metrics {
            metric_map.insert(metric.as_str().to_string(), render_value(value));
            if let Some(summary) = summary_stats(value) {
                summary_map.insert(metric.as_str().to_string(), summary);
            }
        }

        json!({
            "night_dates": self.night_dates.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
            "night_numbers": self.night_numbers,
            "sleep_metrics": Value::Object(metric_map),
            "summary_statistics": Value::Object(summary_map),
        })
    }

    pub fn to_json_string(&self) -> Result<String, NocturneError> {
        serde_json::to_string_pretty(&self.to_json()).map_err(NocturneError::JsonError)
    }
}

fn metric_value(engine: &mut SleepMetrics, metric: SleepMetric) -> MetricValue {
    match metric {
        SleepMetric::SleepDuration => MetricValue::PerNight(engine.sleep_duration()),
        SleepMetric::TimeInBed => MetricValue::PerNight(engine.time_in_bed()),
        SleepMetric::Waso => MetricValue::PerNight(engine.waso()),
        SleepMetric::SleepEfficiency => MetricValue::PerNight(engine.sleep_efficiency()),
        SleepMetric::NumAwakenings => MetricValue::PerNight(
            engine.num_awakenings().into_iter().map(f64::from).collect(),
        ),
        SleepMetric::Waso30 => MetricValue::Scalar(engine.waso_30()),
        SleepMetric::SleepOnset => MetricValue::PerNightTimes(engine.sleep_onset()),
        SleepMetric::SleepWakeup => MetricValue::PerNightTimes(engine.sleep_wakeup()),
        SleepMetric::SleepMidpoint => MetricValue::PerNightTimes(engine.sleep_midpoint()),
        SleepMetric::WeekdayMidpoint => MetricValue::ScalarTime(engine.weekday_midpoint()),
        SleepMetric::WeekendMidpoint => MetricValue::ScalarTime(engine.weekend_midpoint()),
        SleepMetric::SocialJetlag => MetricValue::Scalar(engine.social_jetlag()),
    }
}

fn render_value(value: &MetricValue) -> Value {
    match value {
        MetricValue::PerNight(nums) => nums.iter().map(|n| finite_number(*n)).collect(),
        MetricValue::PerNightTimes(times) => times.iter().map(render_time).collect(),
        MetricValue::Scalar(n) => finite_number(*n),
        MetricValue::ScalarTime(t) => render_time(t),
    }
}

fn render_time(t: &Option<NaiveTime>) -> Value {
    match t {
        Some(t) => Value::String(t.format("%H:%M:%S").to_string()),
        None => Value::Null,
    }
}

/// JSON has no NaN or infinity; non-finite values export as null
fn finite_number(n: f64) -> Value {
    if n.is_finite() {
        json!(n)
    } else {
        Value::Null
    }
}

/// Cross-night summary statistics for per-night sequences: circular mean/std
/// for time-valued metrics, ordinary mean/std otherwise. Scalar metrics carry
/// no summary.
fn summary_stats(value: &MetricValue) -> Option<Value> {
    match value {
        MetricValue::PerNight(nums) => {
            if nums.is_empty() {
                return None;
            }
            Some(json!({
                "mean": finite_number(mean(nums)),
                "std_dev": finite_number(std_dev(nums)),
            }))
        }
        MetricValue::PerNightTimes(times) => {
            let present: Vec<NaiveTime> = times.iter().flatten().copied().collect();
            let mean = circular_mean(&present).ok();
            let std_minutes = circular_std_dev(&present).ok();
            Some(json!({
                "mean": render_time(&mean),
                "std_dev_minutes": std_minutes.map_or(Value::Null, finite_number),
            }))
        }
        MetricValue::Scalar(_) | MetricValue::ScalarTime(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Sample, SleepConfig};
    use chrono::{NaiveDateTime, TimeDelta};
    use pretty_assertions::assert_eq;

    fn full_sleep_day() -> Vec<Sample> {
        let start: NaiveDateTime = "2024-05-02T12:00:00".parse().unwrap();
        (0..1440)
            .map(|i| Sample {
                time: start + TimeDelta::minutes(i),
                sleep_status: true,
                sib_periods: true,
                spt_periods: true,
                nonwear_status: false,
            })
            .collect()
    }

    #[test]
    fn test_report_contains_all_requested_metrics() {
        let samples = full_sleep_day();
        let mut engine = SleepMetrics::new(&samples, &SleepConfig::new("us_eastern")).unwrap();
        let report = SleepReport::build(&mut engine, &MetricCategory::ALL);

        assert_eq!(report.metrics.len(), 12);
        assert_eq!(report.night_dates.len(), 1);
        assert_eq!(report.night_numbers, vec![1]);
    }

    #[test]
    fn test_report_respects_category_selection() {
        let samples = full_sleep_day();
        let mut engine = SleepMetrics::new(&samples, &SleepConfig::new("us_eastern")).unwrap();
        let report = SleepReport::build(&mut engine, &[MetricCategory::SleepDuration]);

        let names: Vec<&str> = report.metrics.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(names, vec!["sleep_duration", "time_in_bed"]);
    }

    #[test]
    fn test_json_document_shape() {
        let samples = full_sleep_day();
        let mut engine = SleepMetrics::new(&samples, &SleepConfig::new("us_eastern")).unwrap();
        let report = SleepReport::build(&mut engine, &MetricCategory::ALL);
        let doc = report.to_json();

        assert_eq!(doc["night_dates"], json!(["2024-05-02"]));
        assert_eq!(doc["night_numbers"], json!([1]));
        assert_eq!(doc["sleep_metrics"]["sleep_duration"], json!([720.0]));
        assert_eq!(doc["sleep_metrics"]["sleep_efficiency"], json!([100.0]));
        assert_eq!(doc["sleep_metrics"]["sleep_onset"], json!(["20:00:00"]));
        assert_eq!(doc["sleep_metrics"]["waso_30"], json!(0.0));
        // only one night, which is a Thursday: no weekend aggregate
        assert_eq!(doc["sleep_metrics"]["weekend_midpoint"], Value::Null);
        assert_eq!(doc["sleep_metrics"]["social_jetlag"], Value::Null);
    }

    #[test]
    fn test_summary_statistics() {
        let samples = full_sleep_day();
        let mut engine = SleepMetrics::new(&samples, &SleepConfig::new("us_eastern")).unwrap();
        let report = SleepReport::build(&mut engine, &MetricCategory::ALL);
        let doc = report.to_json();

        let summary = &doc["summary_statistics"];
        assert_eq!(summary["sleep_duration"]["mean"], json!(720.0));
        assert_eq!(summary["sleep_duration"]["std_dev"], json!(0.0));
        assert_eq!(summary["sleep_onset"]["mean"], json!("20:00:00"));
        // scalar metrics carry no summary rows
        assert!(summary.get("waso_30").is_none());
        assert!(summary.get("social_jetlag").is_none());
    }
}
