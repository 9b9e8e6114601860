//! Validated request configuration, built once from the CLI arguments and
//! passed through the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::cli::Cli;
use crate::errors::ValidationError;
use crate::query;

#[derive(Debug, Clone)]
pub struct StationRequest {
    pub stations: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub path: PathBuf,
    pub info_only: bool,
    pub all_variables: bool,
}

impl StationRequest {
    /// Validates the raw CLI input. No side effects; the output directory is
    /// only created at write time.
    pub fn from_cli(cli: &Cli) -> Result<Self, ValidationError> {
        let stations = split_stations(&cli.stations);
        if stations.is_empty() {
            return Err(ValidationError::NoStations);
        }

        let start = match &cli.start {
            Some(text) => parse_date(text)?,
            None => query::earliest_start(),
        };
        let end = match &cli.end {
            Some(text) => parse_date(text)?,
            None => Local::now().date_naive(),
        };
        if start > end {
            return Err(ValidationError::DateOrder { start, end });
        }

        check_writable(&cli.path)?;

        Ok(StationRequest {
            stations,
            start,
            end,
            path: cli.path.clone(),
            info_only: cli.info,
            all_variables: cli.all_variables,
        })
    }
}

// Station arguments may repeat and may themselves be comma-separated lists.
fn split_stations(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_date(text: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        value: text.to_string(),
    })
}

fn check_writable(path: &Path) -> Result<(), ValidationError> {
    match fs::metadata(path) {
        Ok(metadata) if !metadata.is_dir() => Err(ValidationError::PathNotWritable {
            path: path.to_path_buf(),
        }),
        Ok(metadata) if metadata.permissions().readonly() => {
            Err(ValidationError::PathNotWritable {
                path: path.to_path_buf(),
            })
        }
        // A missing directory is created at write time.
        _ => Ok(()),
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(stations: &[&str]) -> Cli {
        Cli {
            stations: stations.iter().map(|s| s.to_string()).collect(),
            info: false,
            all_variables: false,
            start: None,
            end: None,
            path: PathBuf::from("."),
        }
    }

    #[test]
    fn should_default_to_the_full_historical_range() {
        let request = StationRequest::from_cli(&cli(&["USC00351877"])).unwrap();

        assert_eq!(request.start, query::earliest_start());
        assert_eq!(request.end, Local::now().date_naive());
    }

    #[test]
    fn should_split_comma_separated_stations() {
        let request =
            StationRequest::from_cli(&cli(&["USC00351877,USW00094728", "USC00437054"])).unwrap();

        assert_eq!(
            request.stations,
            vec!["USC00351877", "USW00094728", "USC00437054"]
        );
    }

    #[test]
    fn should_reject_empty_station_list() {
        let e = StationRequest::from_cli(&cli(&[" , "])).unwrap_err();

        assert!(matches!(e, ValidationError::NoStations));
    }

    #[test]
    fn should_parse_explicit_dates() {
        let mut args = cli(&["USC00351877"]);
        args.start = Some("2017-08-15".to_string());
        args.end = Some("2020-12-16".to_string());

        let request = StationRequest::from_cli(&args).unwrap();

        assert_eq!(request.start, NaiveDate::from_ymd_opt(2017, 8, 15).unwrap());
        assert_eq!(request.end, NaiveDate::from_ymd_opt(2020, 12, 16).unwrap());
    }

    #[test]
    fn should_reject_malformed_dates() {
        let mut args = cli(&["USC00351877"]);
        args.start = Some("15/08/2017".to_string());

        let e = StationRequest::from_cli(&args).unwrap_err();

        assert!(matches!(e, ValidationError::InvalidDate { .. }));
        assert!(e.to_string().contains("15/08/2017"));
    }

    #[test]
    fn should_reject_reversed_date_order() {
        let mut args = cli(&["USC00351877"]);
        args.start = Some("2020-12-16".to_string());
        args.end = Some("2017-08-15".to_string());

        let e = StationRequest::from_cli(&args).unwrap_err();

        assert!(matches!(e, ValidationError::DateOrder { .. }));
    }

    #[test]
    fn should_reject_file_as_output_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut args = cli(&["USC00351877"]);
        args.path = file.path().to_path_buf();

        let e = StationRequest::from_cli(&args).unwrap_err();

        assert!(matches!(e, ValidationError::PathNotWritable { .. }));
    }

    #[test]
    fn should_accept_missing_output_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut args = cli(&["USC00351877"]);
        args.path = dir.path().join("not-yet-created");

        assert!(StationRequest::from_cli(&args).is_ok());
    }
}
