//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::DEFAULT_OUTPUT_DIR;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Timestamp and echo every step
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download daily monitor data from EPA AirNow
    Scrape(ScrapeArgs),
    /// Join downloaded metadata and data files into `sites.csv` and `data.csv`
    Merge {
        /// The directory containing raw data to be merged
        input_directory: PathBuf,

        /// The directory to save merged data to
        #[arg(short, long, default_value = ".")]
        output_directory: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// The pollutant to download data for: CO, Pb, NO2, O3, PM10, PM2.5 or SO2
    #[arg(short, long)]
    pub pollutant: String,

    /// Start of the date range, e.g. 2020-01-01, or `today`
    #[arg(short, long)]
    pub start_date: String,

    /// End of the date range, same format as --start-date
    #[arg(short, long)]
    pub end_date: String,

    /// The directory to save data to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_directory: PathBuf,

    /// Comma-separated FIPS codes or two-letter abbreviations; all states by default
    #[arg(short = 'S', long)]
    pub states: Option<String>,

    /// Email for the AQS API; falls back to AQS_EMAIL, then the example account
    #[arg(short = 'E', long)]
    pub email: Option<String>,

    /// Key for the AQS API; falls back to AQS_KEY
    #[arg(short, long)]
    pub key: Option<String>,

    /// Save plain `.csv` instead of `.csv.gz`
    #[arg(long)]
    pub no_compression: bool,

    /// Seconds to pause after each request
    #[arg(long, default_value_t = 5)]
    pub delay: u64,

    /// Seconds to wait for more response data before giving up
    #[arg(long, default_value_t = 300)]
    pub timeout: u64,
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    let bar = ProgressBar::new(size).with_message(message);
    if let Ok(style) = ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {msg}") {
        bar.set_style(style.progress_chars("##-"));
    }

    bar
}

// -- Tests -------------------------------------------------------------------
