//! Pipeline orchestration
//!
//! This module provides the public API for Nocturne. It orchestrates the full
//! pipeline from a processed actigraphy table to the exported sleep-metrics
//! report.

use std::path::{Path, PathBuf};

use log::info;

use crate::error::NocturneError;
use crate::io::{read_processed_data, write_json_report};
use crate::metrics::SleepMetrics;
use crate::report::SleepReport;
use crate::timezones;
use crate::types::{Sample, SleepConfig};

/// Compute sleep metrics for an in-memory sample table.
///
/// Pipeline stages:
/// 1. Timezone validation against the static name table
/// 2. Night segmentation and non-wear validity filtering (plus the optional
///    longest-bout filter)
/// 3. Metric computation for the configured categories
/// 4. Report assembly with night metadata and summary statistics
pub fn compute_report(samples: &[Sample], config: &SleepConfig) -> Result<SleepReport, NocturneError> {
    let iana = timezones::resolve(&config.timezone)?;
    info!("computing sleep metrics with timezone {iana}");

    let mut engine = SleepMetrics::new(samples, config)?;
    Ok(SleepReport::build(&mut engine, &config.categories))
}

/// Compute sleep metrics from a data file and write the JSON report next to
/// it (`<stem>_sleep_metrics.json`). Returns the report and the output path.
pub fn compute_sleep_metrics(
    input: &Path,
    config: &SleepConfig,
) -> Result<(SleepReport, PathBuf), NocturneError> {
    let samples = read_processed_data(input)?;
    let report = compute_report(&samples, config)?;

    let output = output_path(input);
    write_json_report(&report, &output)?;
    Ok((report, output))
}

/// The report path for a given input file
pub fn output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{stem}_sleep_metrics.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetricCategory;
    use chrono::{NaiveDateTime, TimeDelta};
    use pretty_assertions::assert_eq;
    use std::fmt::Write as _;

    fn minute_samples(n: usize) -> Vec<Sample> {
        let start: NaiveDateTime = "2024-05-02T12:00:00".parse().unwrap();
        (0..n)
            .map(|i| Sample {
                time: start + TimeDelta::minutes(i as i64),
                sleep_status: true,
                sib_periods: true,
                spt_periods: true,
                nonwear_status: false,
            })
            .collect()
    }

    #[test]
    fn test_compute_report_in_memory() {
        let report = compute_report(&minute_samples(1440), &SleepConfig::new("us_eastern")).unwrap();
        assert_eq!(report.night_numbers, vec![1]);
        assert_eq!(report.metrics.len(), 12);
    }

    #[test]
    fn test_invalid_timezone_is_fatal() {
        let err =
            compute_report(&minute_samples(1440), &SleepConfig::new("mars_olympus")).unwrap_err();
        assert!(matches!(err, NocturneError::InvalidTimezone(_)));
    }

    #[test]
    fn test_selected_categories_limit_report() {
        let mut config = SleepConfig::new("us_eastern");
        config.categories = vec![MetricCategory::SleepTiming];
        let report = compute_report(&minute_samples(1440), &config).unwrap();
        assert_eq!(report.metrics.len(), 6);
    }

    #[test]
    fn test_end_to_end_from_file() {
        let mut csv = String::from("time,sleep_status,sib_periods,spt_periods,nonwear_status\n");
        let start: NaiveDateTime = "2024-05-02T12:00:00".parse().unwrap();
        for i in 0..1440i64 {
            let t = start + TimeDelta::minutes(i);
            writeln!(csv, "{},true,true,true,false", t.format("%Y-%m-%dT%H:%M:%S")).unwrap();
        }
        let input = std::env::temp_dir().join("nocturne_pipeline_test.csv");
        std::fs::write(&input, csv).unwrap();

        let (report, output) =
            compute_sleep_metrics(&input, &SleepConfig::new("us_eastern")).unwrap();
        assert_eq!(report.night_dates[0].to_string(), "2024-05-02");
        assert!(output.ends_with("nocturne_pipeline_test_sleep_metrics.json"));

        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(doc["sleep_metrics"]["sleep_efficiency"][0], 100.0);
        assert_eq!(doc["sleep_metrics"]["waso"][0], 0.0);

        let _ = std::fs::remove_file(&input);
        let _ = std::fs::remove_file(&output);
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("/data/subject01.csv")),
            PathBuf::from("/data/subject01_sleep_metrics.json")
        );
    }
}
