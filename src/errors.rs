//! Error taxonomy for the retrieval pipeline.
//!
//! Each stage has its own error enum so failures can be classified at the CLI
//! boundary: bad input, a failed request, an unexpected response, or a failed
//! file write. Everything converges on [`FetchError`] for reporting.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T, E = FetchError> = std::result::Result<T, E>;

/// Rejected CLI input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("invalid date `{value}`: expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("start date {start} is after end date {end}")]
    DateOrder { start: NaiveDate, end: NaiveDate },

    #[error("no station ID given")]
    NoStations,

    #[error("output path `{path}` is not a writable directory")]
    PathNotWritable { path: PathBuf },
}

/// Request failure at the HTTP boundary.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("request to the NCEI data service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("NCEI data service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
}

/// Malformed or unexpected response content.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("no data available for station `{station}`; check the station ID")]
    StationNotFound { station: String },

    #[error("no data available for station `{station}` over dates {start}-{end}; check the date range")]
    NoDataInRange {
        station: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("station `{station}` has data, but none of the core elements (PRCP, SNOW, SNWD, TMAX, TMIN)")]
    NoCoreElements { station: String },

    #[error("empty response for station `{station}`")]
    EmptyResponse { station: String },

    #[error("duplicate observation for station `{station}` on {date} ({element})")]
    DuplicateRecord {
        station: String,
        date: NaiveDate,
        element: String,
    },

    #[error("malformed response: {reason}")]
    Malformed { reason: String },

    #[error("malformed CSV response: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Filesystem or serialisation failure while saving the output file.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to write output file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build record batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("failed to write parquet data: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

/// Top-level error surfaced at the CLI boundary with exit code 1.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("station task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

// -- Tests -------------------------------------------------------------------
