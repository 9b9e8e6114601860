//! Query construction for the NCEI Data Service API.
//!
//! Pure string building, no I/O. The data endpoint serves observations as
//! CSV; the search endpoint reports station availability as JSON. See the
//! [API documentation](https://www.ncei.noaa.gov/support/access-data-service-api-user-documentation).

use chrono::NaiveDate;
use url::Url;

/// The one dataset this tool targets.
pub const DATASET: &str = "daily-summaries";

/// Core GHCND elements requested when `--all-variables` is off.
pub const CORE_DATA_TYPES: [&str; 5] = ["PRCP", "SNOW", "SNWD", "TMAX", "TMIN"];

const DATA_ENDPOINT: &str = "https://www.ncei.noaa.gov/access/services/data/v1";
const SEARCH_ENDPOINT: &str = "https://www.ncei.noaa.gov/access/services/search/v1/data";

/// Default start of the historical range, predating every GHCND record.
pub fn earliest_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1750, 1, 1).expect("valid date")
}

/// Builds the observation query for one station over a date range.
///
/// `units=metric` keeps the values in the units the output attributes
/// declare. `includeAttributes` carries the measurement/quality/source flags
/// alongside each value.
pub fn data_url(station: &str, start: NaiveDate, end: NaiveDate, all_variables: bool) -> Url {
    let mut url = Url::parse(DATA_ENDPOINT).expect("endpoint URL should be valid");
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("dataset", DATASET)
            .append_pair("stations", station)
            .append_pair("startDate", &format_date(start))
            .append_pair("endDate", &format_date(end))
            .append_pair("units", "metric")
            .append_pair("includeAttributes", "true");
        if !all_variables {
            pairs.append_pair("dataTypes", &CORE_DATA_TYPES.join(","));
        }
        pairs.append_pair("format", "csv");
    }

    url
}

/// Builds the availability search query for one station over a date range.
pub fn search_url(station: &str, start: NaiveDate, end: NaiveDate) -> Url {
    let mut url = Url::parse(SEARCH_ENDPOINT).expect("endpoint URL should be valid");
    url.query_pairs_mut()
        .append_pair("dataset", DATASET)
        .append_pair("stations", station)
        .append_pair("available", "true")
        .append_pair("startDate", &format_date(start))
        .append_pair("endDate", &format_date(end))
        .append_pair("format", "json");

    url
}

/// The NCDC web page describing a station, for info-mode output.
pub fn station_page_url(station: &str) -> String {
    format!("https://www.ncdc.noaa.gov/cdo-web/datasets/GHCND/stations/GHCND:{station}/detail")
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2017, 8, 15).unwrap(),
            NaiveDate::from_ymd_opt(2020, 12, 16).unwrap(),
        )
    }

    #[test]
    fn should_carry_station_and_dates_verbatim() {
        let (start, end) = range();
        let url = data_url("USC00351877", start, end, false);
        let query = url.query().unwrap();

        assert!(query.contains("dataset=daily-summaries"));
        assert!(query.contains("stations=USC00351877"));
        assert!(query.contains("startDate=2017-08-15"));
        assert!(query.contains("endDate=2020-12-16"));
        assert!(query.contains("format=csv"));
    }

    #[test]
    fn should_request_core_data_types_by_default() {
        let (start, end) = range();
        let url = data_url("USC00351877", start, end, false);

        assert!(url
            .query_pairs()
            .any(|(k, v)| k == "dataTypes" && v == "PRCP,SNOW,SNWD,TMAX,TMIN"));
    }

    #[test]
    fn should_omit_data_types_when_all_variables_requested() {
        let (start, end) = range();
        let url = data_url("USC00351877", start, end, true);

        assert!(!url.query().unwrap().contains("dataTypes"));
    }

    #[test]
    fn should_build_search_query() {
        let (start, end) = range();
        let url = search_url("USC00351877", start, end);
        let query = url.query().unwrap();

        assert!(url.as_str().starts_with(SEARCH_ENDPOINT));
        assert!(query.contains("stations=USC00351877"));
        assert!(query.contains("available=true"));
        assert!(query.contains("format=json"));
    }

    #[test]
    fn should_link_station_page() {
        assert_eq!(
            station_page_url("USC00351877"),
            "https://www.ncdc.noaa.gov/cdo-web/datasets/GHCND/stations/GHCND:USC00351877/detail"
        );
    }
}
