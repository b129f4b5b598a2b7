//! HTTP access to the AQS API, the AirNow broker and the data links it
//! prepares.

use std::{path::Path, time::Duration};

use chrono::NaiveDate;
use indicatif::ProgressBar;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{
    cli::create_spinner,
    config::{Config, CONNECT_TIMEOUT},
    download::download_to_file,
    error::Result,
    lookup::{lookup_query, read_lookup_response, Monitor, MONITORS_URL},
    registry::{codes_for, Pollutant},
    resolve::{data_link_query, parse_data_link, DataLink, BROKER_URL},
};

/// The remote calls a scrape run depends on.
#[allow(async_fn_in_trait)]
pub trait Source {
    /// Unknown pollutant names produce an empty list, not an error.
    async fn list_monitors(
        &self,
        pollutant: &str,
        region_code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Monitor>>;

    async fn resolve_download_link(&self, pollutant: Pollutant, year: i32, monitor: &Monitor) -> Result<DataLink>;

    async fn fetch_to_file(&self, url: &str, destination: &Path, use_compression: bool) -> Result<()>;
}

pub struct AirNowClient {
    client: Client,
    email: String,
    key: String,
    request_delay: Duration,
    show_progress: bool,
}

impl AirNowClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(config.read_timeout)
            .build()?;

        Ok(AirNowClient {
            client,
            email: config.email.clone(),
            key: config.key.clone(),
            request_delay: config.request_delay,
            show_progress: config.verbose,
        })
    }

    async fn sleep(&self) {
        debug!("sleeping {:?}", self.request_delay);
        tokio::time::sleep(self.request_delay).await;
    }

    fn progress_bar(&self, destination: &Path) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let file_name = destination
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();

        create_spinner(format!("Downloading {file_name}"))
    }
}

impl Source for AirNowClient {
    async fn list_monitors(
        &self,
        pollutant: &str,
        region_code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Monitor>> {
        let Some(codes) = codes_for(pollutant) else {
            warn!(
                "invalid pollutant {pollutant}; available pollutants: {}",
                Pollutant::names()
            );
            return Ok(Vec::new());
        };

        let query = lookup_query(&self.email, &self.key, codes, region_code, start_date, end_date);
        let response = self.client.get(MONITORS_URL).query(&query).send().await?;
        self.sleep().await;

        let status = response.status();
        let body = response.text().await?;
        read_lookup_response(status, &body)
    }

    async fn resolve_download_link(&self, pollutant: Pollutant, year: i32, monitor: &Monitor) -> Result<DataLink> {
        let query = data_link_query(pollutant, year, monitor);
        let response = self.client.get(BROKER_URL).query(&query).send().await?;
        self.sleep().await;

        let html = response.error_for_status()?.text().await?;
        parse_data_link(&html)
    }

    async fn fetch_to_file(&self, url: &str, destination: &Path, use_compression: bool) -> Result<()> {
        let bar = self.progress_bar(destination);
        let bytes = download_to_file(&self.client, url, destination, use_compression, bar.clone()).await?;
        bar.finish_and_clear();
        debug!("wrote {bytes} bytes to {}", destination.display());
        self.sleep().await;

        Ok(())
    }
}

// -- Tests -------------------------------------------------------------------
