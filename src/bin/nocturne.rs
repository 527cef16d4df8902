//! Nocturne CLI
//!
//! Commands:
//! - compute-metrics: compute sleep metrics from actigraphy data and save
//!   the results as JSON next to the input file
//! - timezones: list the supported timezone keys

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use log::error;

use nocturne::io::write_nightly_csv;
use nocturne::pipeline::compute_sleep_metrics;
use nocturne::types::{MetricCategory, NightWindow, SleepConfig};
use nocturne::{timezones, NocturneError, NOCTURNE_VERSION};

/// Nocturne - compute nocturnal sleep metrics from processed actigraphy data
#[derive(Parser)]
#[command(name = "nocturne")]
#[command(version = NOCTURNE_VERSION)]
#[command(about = "Compute nocturnal sleep metrics from wearable data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute sleep metrics and save results as JSON next to the input file
    ComputeMetrics {
        /// Path to the input data file (.csv or .tsv) with processed
        /// actigraphy columns: time, sleep_status, sib_periods, spt_periods,
        /// nonwear_status
        input: PathBuf,

        /// Timezone of the recording: a friendly key (e.g. us_eastern) or an
        /// IANA identifier from the supported table
        #[arg(short = 'z', long)]
        timezone: String,

        /// Start of the nocturnal interval (HH:MM)
        #[arg(short = 's', long, default_value = "20:00", value_parser = parse_time)]
        night_start: NaiveTime,

        /// End of the nocturnal interval (HH:MM)
        #[arg(short = 'e', long, default_value = "08:00", value_parser = parse_time)]
        night_end: NaiveTime,

        /// Non-wear fraction (0.0-1.0) at or below which a night is valid
        #[arg(short = 't', long, default_value = "0.2")]
        nw_threshold: f64,

        /// Metric categories to compute; repeat to select several
        /// (sleep_duration, sleep_continuity, sleep_timing). All when omitted.
        #[arg(short = 'm', long = "metrics")]
        selected_metrics: Vec<MetricCategory>,

        /// Keep only the longest continuous sleep bout per night
        #[arg(long)]
        only_longest_sleep: bool,

        /// Also write a per-night CSV table to this path
        #[arg(long)]
        nightly_csv: Option<PathBuf>,
    },

    /// List the supported timezone keys and their IANA identifiers
    Timezones,
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| {
        format!("Invalid time format: {value}. Expected HH:MM format (e.g., 20:00, 08:30).")
    })
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), NocturneError> {
    match command {
        Commands::ComputeMetrics {
            input,
            timezone,
            night_start,
            night_end,
            nw_threshold,
            selected_metrics,
            only_longest_sleep,
            nightly_csv,
        } => {
            let mut config = SleepConfig::new(timezone);
            config.night_window = NightWindow::new(night_start, night_end)?;
            config.nw_threshold = nw_threshold;
            config.only_longest_sleep = only_longest_sleep;
            if !selected_metrics.is_empty() {
                config.categories = selected_metrics;
            }

            let (report, output) = compute_sleep_metrics(&input, &config)?;
            println!(
                "Computed {} metric(s) over {} night(s); results in {}",
                report.metrics.len(),
                report.night_dates.len(),
                output.display()
            );

            if let Some(path) = nightly_csv {
                write_nightly_csv(&report, &path)?;
                println!("Per-night table in {}", path.display());
            }
            Ok(())
        }
        Commands::Timezones => {
            for (key, iana) in timezones::TIMEZONE_MAP {
                println!("{key:24} {iana}");
            }
            Ok(())
        }
    }
}
