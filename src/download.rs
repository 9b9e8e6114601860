//! HTTP boundary to the NCEI data service.
//!
//! One thin client wraps `reqwest`: it runs the queries built by
//! [`crate::query`], maps non-2xx responses into [`NetworkError`] with the
//! service's own error message, and resolves station coverage.

use std::time::Duration;

use chrono::{Local, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::errors::{NetworkError, ParseError, Result};
use crate::query;
use crate::reading::{SearchResponse, StationCoverage};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the NCEI data and search endpoints.
#[derive(Debug, Clone)]
pub struct NceiClient {
    client: Client,
}

impl NceiClient {
    pub fn new() -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("ghcnd/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Fetches the observations CSV for a station over a date range.
    pub async fn daily_csv(
        &self,
        station: &str,
        start: NaiveDate,
        end: NaiveDate,
        all_variables: bool,
    ) -> Result<String> {
        let url = query::data_url(station, start, end, all_variables);
        self.get_text(url).await
    }

    /// Runs an availability search for a station over a date range.
    pub async fn search(
        &self,
        station: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SearchResponse> {
        let url = query::search_url(station, start, end);
        let body = self.get_text(url).await?;
        let response = serde_json::from_str(&body).map_err(ParseError::Json)?;

        Ok(response)
    }

    /// Looks up a station's metadata and coverage for the requested range.
    ///
    /// An empty search result is disambiguated with a second probe over the
    /// full historical range: an unknown station and a known station with no
    /// data in the range produce different errors.
    pub async fn lookup(
        &self,
        station: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<StationCoverage> {
        let response = self.search(station, start, end).await?;

        match StationCoverage::from_search(station, &response)? {
            Some(coverage) => Ok(coverage),
            None => {
                let probe = self
                    .search(station, query::earliest_start(), Local::now().date_naive())
                    .await?;

                if probe.results.is_empty() {
                    Err(ParseError::StationNotFound {
                        station: station.to_string(),
                    }
                    .into())
                } else {
                    Err(ParseError::NoDataInRange {
                        station: station.to_string(),
                        start,
                        end,
                    }
                    .into())
                }
            }
        }
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(NetworkError::Http)?;
        let status = response.status();
        let body = response.text().await.map_err(NetworkError::Http)?;

        if !status.is_success() {
            return Err(NetworkError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            }
            .into());
        }

        Ok(body)
    }
}

/// Error body shape the service returns on 4xx/5xx.
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "errorMessage", default)]
    error_message: Option<String>,
    #[serde(default)]
    errors: Vec<ApiFieldError>,
}

#[derive(Debug, Deserialize)]
struct ApiFieldError {
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Distils the service's error body into one line, translating API parameter
/// names back to the CLI options the user actually typed.
fn api_error_message(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<ApiError>(body) else {
        return summarise(body);
    };

    let mut parts = Vec::new();
    if let Some(message) = parsed.error_message {
        parts.push(message);
    }
    for error in parsed.errors {
        let field = error.field.as_deref().map(cli_field_name);
        match (field, error.message) {
            (Some(field), Some(message)) => {
                parts.push(format!("{message} (check the `{field}` argument)"))
            }
            (None, Some(message)) => parts.push(message),
            (Some(field), None) => parts.push(format!("check the `{field}` argument")),
            (None, None) => {}
        }
    }

    if parts.is_empty() {
        summarise(body)
    } else {
        parts.join("; ")
    }
}

fn cli_field_name(field: &str) -> &str {
    match field {
        "startDate" => "start",
        "endDate" => "end",
        "stations" => "station",
        other => other,
    }
}

fn summarise(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }

    trimmed.chars().take(200).collect()
}

// -- Tests -------------------------------------------------------------------
