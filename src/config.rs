use std::{path::PathBuf, time::Duration};

use tracing::warn;

pub const AQS_DEFAULT_EMAIL: &str = "test@aqs.api";
pub const AQS_DEFAULT_KEY: &str = "test";
pub const DEFAULT_OUTPUT_DIR: &str = "./airnow_data/";
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(5);
/// Longest wait for the next bytes of a response, not for the whole body.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(300);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by the HTTP client and the scrape orchestrator.
#[derive(Debug, Clone)]
pub struct Config {
    pub email: String,
    pub key: String,
    pub output_directory: PathBuf,
    pub use_compression: bool,
    pub request_delay: Duration,
    pub read_timeout: Duration,
    pub verbose: bool,
}

impl Config {
    /// Credentials fall back to `AQS_EMAIL` / `AQS_KEY` and then to the public
    /// test account.
    pub fn new(email: Option<String>, key: Option<String>, output_directory: PathBuf) -> Self {
        let email = email
            .or_else(|| std::env::var("AQS_EMAIL").ok())
            .unwrap_or_else(|| AQS_DEFAULT_EMAIL.into());
        let key = key
            .or_else(|| std::env::var("AQS_KEY").ok())
            .unwrap_or_else(|| AQS_DEFAULT_KEY.into());

        let config = Config {
            email,
            key,
            output_directory,
            use_compression: true,
            request_delay: DEFAULT_REQUEST_DELAY,
            read_timeout: DEFAULT_READ_TIMEOUT,
            verbose: false,
        };
        if config.uses_default_credentials() {
            warn!("using default AQS credentials; requests may be rejected");
        }

        config
    }

    pub fn uses_default_credentials(&self) -> bool {
        self.email == AQS_DEFAULT_EMAIL || self.key == AQS_DEFAULT_KEY
    }

    pub fn with_compression(mut self, use_compression: bool) -> Self {
        self.use_compression = use_compression;
        self
    }

    pub fn with_request_delay(mut self, request_delay: Duration) -> Self {
        self.request_delay = request_delay;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

// -- Tests -------------------------------------------------------------------
