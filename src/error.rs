use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid pollutant `{0}`; available pollutants: {1}")]
    InvalidPollutant(String, String),

    #[error("invalid date string `{0}`; expected `today`, YYYY-MM-DD, YYYYMMDD or MM/DD/YYYY")]
    InvalidDate(String),

    #[error("could not understand region `{0}`; expected a 2-digit code or 2-letter abbreviation")]
    InvalidRegion(String),

    #[error("start date {0} is after end date {1}")]
    InvalidDateRange(chrono::NaiveDate, chrono::NaiveDate),

    #[error("Lookup service rejected request (incorrect parameters or AQS API was updated): {header}")]
    LookupRejected { header: String },

    #[error("Unexpected response shape: {0}")]
    UnexpectedResponse(String),

    #[error("Could not merge {path}: {reason}")]
    Merge { path: PathBuf, reason: String },

    #[error("Server responded with {0}")]
    Status(reqwest::StatusCode),

    #[error("Http Error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),
}
