pub mod merge;
pub mod scrape;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
pub use merge::merge;
pub use scrape::scrape;

use crate::registry::Pollutant;

/// `{monitor}_{YYYYMMDD}.json`, one per monitor per day of running.
pub fn make_metadata_file_name(output_directory: &Path, monitor_id: &str, today: NaiveDate) -> PathBuf {
    let file_name = format!("{}_{}.json", monitor_id, today.format("%Y%m%d"));

    output_directory.join(file_name)
}

/// `{monitor}_{pollutant}_{year}_{YYYYMMDD}.csv`, with `.gz` when compressed.
pub fn make_data_file_name(
    output_directory: &Path,
    monitor_id: &str,
    pollutant: Pollutant,
    year: i32,
    today: NaiveDate,
    use_compression: bool,
) -> PathBuf {
    let extension = if use_compression { "csv.gz" } else { "csv" };
    let file_name = format!(
        "{}_{}_{}_{}.{}",
        monitor_id,
        pollutant.name(),
        year,
        today.format("%Y%m%d"),
        extension
    );

    output_directory.join(file_name)
}

// -- Tests -------------------------------------------------------------------
