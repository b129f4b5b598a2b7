//! Scrape daily monitor data for one pollutant across a set of states.
//!
//! For each state the monitors active in the date range are looked up; each
//! monitor gets its metadata saved once and one download attempt per year.
//! Files already on disk are never fetched again, so a run can be restarted
//! after a failure and only the missing files are downloaded.

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use tracing::info;

use crate::{
    cli::ScrapeArgs,
    client::{AirNowClient, Source},
    config::Config,
    error::{self, Error},
    lookup::Monitor,
    registry::{self, Pollutant},
    resolve::DataLink,
};

use super::{make_data_file_name, make_metadata_file_name};

pub async fn scrape(args: ScrapeArgs, verbose: bool) -> Result<String> {
    let today = Local::now().date_naive();
    let request = ScrapeRequest::from_args(&args, today)?;

    let config = Config::new(args.email, args.key, args.output_directory)
        .with_compression(!args.no_compression)
        .with_request_delay(Duration::from_secs(args.delay))
        .with_read_timeout(Duration::from_secs(args.timeout))
        .with_verbose(verbose);

    fs::create_dir_all(&config.output_directory).with_context(|| {
        format!("could not create output directory {}", config.output_directory.display())
    })?;
    info!("saving output to {}", config.output_directory.display());

    let client = AirNowClient::new(&config)?;
    let summary = Scraper::new(&client, &config, today).scrape(&request).await?;
    info!(
        monitors = summary.monitors,
        metadata_written = summary.metadata_written,
        downloaded = summary.downloaded,
        skipped = summary.skipped,
        unavailable = summary.unavailable,
        "scrape complete"
    );

    Ok(config.output_directory.to_string_lossy().to_string())
}

/// A validated scrape: every field has been checked before any I/O happens.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeRequest {
    pub pollutant: Pollutant,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub region_codes: Vec<&'static str>,
}

impl ScrapeRequest {
    pub fn from_args(args: &ScrapeArgs, today: NaiveDate) -> error::Result<Self> {
        let pollutant = Pollutant::from_name(&args.pollutant)
            .ok_or_else(|| Error::InvalidPollutant(args.pollutant.clone(), Pollutant::names()))?;
        let start_date = parse_date(&args.start_date, today)?;
        let end_date = parse_date(&args.end_date, today)?;
        if start_date > end_date {
            return Err(Error::InvalidDateRange(start_date, end_date));
        }
        let region_codes = parse_regions(args.states.as_deref())?;

        Ok(ScrapeRequest {
            pollutant,
            start_date,
            end_date,
            region_codes,
        })
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start_date.year()..=self.end_date.year()
    }
}

pub fn parse_date(s: &str, today: NaiveDate) -> error::Result<NaiveDate> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("today") {
        return Ok(today);
    }

    ["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| Error::InvalidDate(s.to_string()))
}

/// Accepts FIPS codes and abbreviations in any mix; `None` selects every state.
pub fn parse_regions(states: Option<&str>) -> error::Result<Vec<&'static str>> {
    let Some(states) = states else {
        return Ok(registry::all_region_codes());
    };

    let mut codes = Vec::new();
    for state in states.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let code = registry::REGIONS
            .iter()
            .find(|(abbr, code)| *code == state || abbr.eq_ignore_ascii_case(state))
            .map(|(_, code)| *code)
            .ok_or_else(|| Error::InvalidRegion(state.to_string()))?;
        if !codes.contains(&code) {
            codes.push(code);
        }
    }

    if codes.is_empty() {
        return Err(Error::InvalidRegion(states.to_string()));
    }

    Ok(codes)
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScrapeSummary {
    pub monitors: usize,
    pub metadata_written: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub unavailable: usize,
}

pub struct Scraper<'a, S: Source> {
    source: &'a S,
    output_directory: PathBuf,
    use_compression: bool,
    today: NaiveDate,
}

impl<'a, S: Source> Scraper<'a, S> {
    pub fn new(source: &'a S, config: &Config, today: NaiveDate) -> Self {
        Scraper {
            source,
            output_directory: config.output_directory.clone(),
            use_compression: config.use_compression,
            today,
        }
    }

    /// A rejected monitor lookup or a transport failure ends the run; a year
    /// without a data link does not.
    pub async fn scrape(&self, request: &ScrapeRequest) -> error::Result<ScrapeSummary> {
        let mut summary = ScrapeSummary::default();

        for region_code in request.region_codes.iter().copied() {
            let monitors = self
                .source
                .list_monitors(request.pollutant.name(), region_code, request.start_date, request.end_date)
                .await?;
            info!(
                "found {} active monitors in state {}",
                monitors.len(),
                registry::abbreviation_for(region_code).unwrap_or(region_code)
            );

            for monitor in &monitors {
                summary.monitors += 1;
                if self.save_metadata(monitor)? {
                    summary.metadata_written += 1;
                }
                for year in request.years() {
                    self.get_data(request.pollutant, year, monitor, &mut summary).await?;
                }
            }
        }

        Ok(summary)
    }

    /// Returns false when today's metadata file already exists.
    fn save_metadata(&self, monitor: &Monitor) -> error::Result<bool> {
        let path = make_metadata_file_name(&self.output_directory, monitor.id(), self.today);
        if path.exists() {
            return Ok(false);
        }

        fs::write(&path, serde_json::to_string_pretty(monitor.metadata())?)?;
        Ok(true)
    }

    async fn get_data(
        &self,
        pollutant: Pollutant,
        year: i32,
        monitor: &Monitor,
        summary: &mut ScrapeSummary,
    ) -> error::Result<()> {
        let output_file = self.data_file_name(pollutant, year, monitor);
        let state = registry::abbreviation_for(monitor.region_code()).unwrap_or(monitor.region_code());

        if output_file.exists() {
            info!("skipping:    {} ({}, {}) - already exists", monitor.id(), state, year);
            summary.skipped += 1;
            return Ok(());
        }

        info!("downloading: {} ({}, {})", monitor.id(), state, year);
        match self.source.resolve_download_link(pollutant, year, monitor).await? {
            DataLink::Active(url) => {
                self.source
                    .fetch_to_file(&url, &output_file, self.use_compression)
                    .await?;
                info!("> success: {}", output_file.display());
                summary.downloaded += 1;
            }
            DataLink::Unavailable => {
                info!("> no data link for {} ({}, {})", monitor.id(), state, year);
                summary.unavailable += 1;
            }
        }

        Ok(())
    }

    fn data_file_name(&self, pollutant: Pollutant, year: i32, monitor: &Monitor) -> PathBuf {
        make_data_file_name(
            &self.output_directory,
            monitor.id(),
            pollutant,
            year,
            self.today,
            self.use_compression,
        )
    }
}

// -- Tests -------------------------------------------------------------------
