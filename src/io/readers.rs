//! Processed-data readers
//!
//! Loads processed actigraphy tables from CSV or TSV files. Only the columns
//! relevant to sleep metrics are kept. Timestamps may be RFC 3339 (the UTC
//! offset is folded into local wall-clock time) or naive
//! `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS` forms.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use log::info;

use crate::error::NocturneError;
use crate::types::Sample;

/// The columns a processed actigraphy table must provide
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "time",
    "sleep_status",
    "sib_periods",
    "spt_periods",
    "nonwear_status",
];

/// Read a processed actigraphy table from a `.csv` or `.tsv` file.
///
/// Fails with `FileNotFound` when the file is absent, `UnsupportedFormat` for
/// any other extension, and `MissingColumns` naming every absent required
/// column. The returned samples are sorted by timestamp ascending.
pub fn read_processed_data(path: &Path) -> Result<Vec<Sample>, NocturneError> {
    if !path.exists() {
        return Err(NocturneError::FileNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let delimiter = match extension {
        "csv" => b',',
        "tsv" => b'\t',
        other => return Err(NocturneError::UnsupportedFormat(format!(".{other}"))),
    };

    let samples = parse_table(File::open(path)?, delimiter)?;
    info!("read {} sample(s) from {}", samples.len(), path.display());
    Ok(samples)
}

/// Parse a delimited table of samples from any reader
pub fn parse_table<R: Read>(reader: R, delimiter: u8) -> Result<Vec<Sample>, NocturneError> {
    let mut table = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(reader);

    let headers = table.headers()?.clone();
    let column_index = |name: &str| headers.iter().position(|h| h == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| column_index(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(NocturneError::MissingColumns(missing));
    }

    let indices: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .filter_map(|c| column_index(c))
        .collect();
    let (time_idx, sleep_idx, sib_idx, spt_idx, nonwear_idx) =
        (indices[0], indices[1], indices[2], indices[3], indices[4]);

    let mut samples = Vec::new();
    for record in table.records() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).unwrap_or_default();
        samples.push(Sample {
            time: parse_timestamp(cell(time_idx))?,
            sleep_status: parse_bool("sleep_status", cell(sleep_idx))?,
            sib_periods: parse_bool("sib_periods", cell(sib_idx))?,
            spt_periods: parse_bool("spt_periods", cell(spt_idx))?,
            nonwear_status: parse_bool("nonwear_status", cell(nonwear_idx))?,
        });
    }

    samples.sort_by_key(|s| s.time);
    Ok(samples)
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, NocturneError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    Err(NocturneError::ParseError {
        column: "time".to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(column: &str, value: &str) -> Result<bool, NocturneError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(NocturneError::ParseError {
            column: column.to_string(),
            value: value.to_string(),
        }),
    }
}
