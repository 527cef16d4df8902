//! File adapters
//!
//! Readers for processed actigraphy tables and writers for the metric
//! results. The core pipeline consumes an in-memory sample table from here
//! and hands a finished report back.

pub mod readers;
pub mod writers;

pub use readers::read_processed_data;
pub use writers::{write_json_report, write_nightly_csv};
