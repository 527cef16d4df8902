//! Result writers
//!
//! Serializes an assembled report to a JSON document, and optionally to a
//! per-night CSV table with one row per valid night.

use std::fs;
use std::path::Path;

use log::info;

use crate::error::NocturneError;
use crate::report::{MetricValue, SleepReport};

/// Write the full report document as pretty-printed JSON
pub fn write_json_report(report: &SleepReport, path: &Path) -> Result<(), NocturneError> {
    fs::write(path, report.to_json_string()?)?;
    info!("wrote sleep metrics to {}", path.display());
    Ok(())
}

/// Write the per-night metrics as a CSV table.
///
/// Columns are `night_date`, `night_number`, and one column per per-night
/// metric; cross-night scalar metrics have no per-night row and are skipped.
/// Unavailable time cells are left empty.
pub fn write_nightly_csv(report: &SleepReport, path: &Path) -> Result<(), NocturneError> {
    let per_night: Vec<_> = report
        .metrics
        .iter()
        .filter(|(_, v)| {
            matches!(
                v,
                MetricValue::PerNight(_) | MetricValue::PerNightTimes(_)
            )
        })
        .collect();

    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["night_date".to_string(), "night_number".to_string()];
    header.extend(per_night.iter().map(|(m, _)| m.as_str().to_string()));
    writer.write_record(&header)?;

    for (i, (date, number)) in report
        .night_dates
        .iter()
        .zip(&report.night_numbers)
        .enumerate()
    {
        let mut row = vec![date.to_string(), number.to_string()];
        for (_, value) in &per_night {
            row.push(match value {
                MetricValue::PerNight(nums) => nums[i].to_string(),
                MetricValue::PerNightTimes(times) => times[i]
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            });
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    info!("wrote per-night table to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::SleepMetrics;
    use crate::types::{MetricCategory, Sample, SleepConfig};
    use chrono::{NaiveDateTime, TimeDelta};
    use pretty_assertions::assert_eq;

    fn report() -> SleepReport {
        let start: NaiveDateTime = "2024-05-02T12:00:00".parse().unwrap();
        let samples: Vec<Sample> = (0..1440)
            .map(|i| Sample {
                time: start + TimeDelta::minutes(i),
                sleep_status: true,
                sib_periods: true,
                spt_periods: true,
                nonwear_status: false,
            })
            .collect();
        let mut engine = SleepMetrics::new(&samples, &SleepConfig::new("us_eastern")).unwrap();
        SleepReport::build(&mut engine, &MetricCategory::ALL)
    }

    #[test]
    fn test_json_report_round_trips() {
        let path = std::env::temp_dir().join("nocturne_writer_test.json");
        write_json_report(&report(), &path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["night_dates"][0], "2024-05-02");
        assert_eq!(parsed["sleep_metrics"]["sleep_duration"][0], 720.0);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_nightly_csv_shape() {
        let path = std::env::temp_dir().join("nocturne_writer_test.csv");
        write_nightly_csv(&report(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("night_date,night_number,sleep_duration"));
        assert!(!header.contains("waso_30"));
        assert!(!header.contains("social_jetlag"));

        let row = lines.next().unwrap();
        assert!(row.starts_with("2024-05-02,1,720"));
        assert_eq!(lines.next(), None);
        let _ = fs::remove_file(&path);
    }
}
