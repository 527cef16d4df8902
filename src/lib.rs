//! Nocturne - compute engine for nocturnal sleep metrics
//!
//! Nocturne derives per-night sleep duration, continuity, and timing metrics
//! from pre-processed wearable-actigraphy time series through a deterministic
//! pipeline: night segmentation → non-wear validity filtering → (optional)
//! longest-bout extraction → metric computation → report assembly.
//!
//! ## Modules
//!
//! - **circular**: circular statistics for averaging clock times across midnight
//! - **segmentation**: partitioning the sample series into valid nights
//! - **bouts**: longest contiguous sleep bout per night
//! - **metrics**: the lazy, memoized per-night metric engine
//! - **report**: category dispatch, summary statistics, and export document
//! - **io**: CSV/TSV readers and JSON/CSV writers
//! - **timezones**: friendly-name to IANA identifier resolution

pub mod bouts;
pub mod circular;
pub mod error;
pub mod io;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod segmentation;
pub mod timezones;
pub mod types;

pub use error::NocturneError;
pub use metrics::SleepMetrics;
pub use pipeline::{compute_report, compute_sleep_metrics};
pub use report::{MetricValue, SleepReport};
pub use types::{MetricCategory, NightWindow, Sample, SleepConfig, SleepMetric};

/// Nocturne version embedded in CLI output
pub const NOCTURNE_VERSION: &str = env!("CARGO_PKG_VERSION");
