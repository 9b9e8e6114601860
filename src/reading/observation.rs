//! Deserialises the data endpoint's CSV response into observation records.
//!
//! Columns are discovered from the header row: `STATION` and `DATE` plus one
//! column per element, each optionally followed by a `<CODE>_ATTRIBUTES`
//! column holding the measurement/quality/source flags. Empty cells mean the
//! station did not report that element on that date and produce no record.

use chrono::NaiveDate;

use crate::errors::ParseError;
use crate::reading::Element;

/// One value for one (station, date, element) tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub station: String,
    pub date: NaiveDate,
    pub element: Element,
    pub value: f32,
    pub quality: Option<String>,
}

/// Parses a daily-summaries CSV body into records, preserving sparsity.
pub fn parse_daily_csv(station: &str, body: &str) -> Result<Vec<ObservationRecord>, ParseError> {
    if body.trim().is_empty() {
        return Err(ParseError::EmptyResponse {
            station: station.to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    let headers = reader.headers()?.clone();

    let date_col = headers
        .iter()
        .position(|h| h == "DATE")
        .ok_or_else(|| ParseError::Malformed {
            reason: "data response has no DATE column".to_string(),
        })?;
    let station_col = headers.iter().position(|h| h == "STATION");
    let element_cols = element_columns(&headers, date_col, station_col);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;

        let date_text = row.get(date_col).unwrap_or_default();
        let date =
            NaiveDate::parse_from_str(date_text, "%Y-%m-%d").map_err(|_| ParseError::Malformed {
                reason: format!("unparseable observation date `{date_text}`"),
            })?;
        let row_station = station_col
            .and_then(|col| row.get(col))
            .filter(|s| !s.is_empty())
            .unwrap_or(station);

        for (col, element, attributes_col) in &element_cols {
            let cell = row.get(*col).unwrap_or_default();
            if cell.is_empty() {
                continue;
            }
            let value: f32 = cell.parse().map_err(|_| ParseError::Malformed {
                reason: format!("unparseable {element} value `{cell}` on {date}"),
            })?;
            let quality = attributes_col
                .and_then(|col| row.get(col))
                .and_then(quality_flag);

            records.push(ObservationRecord {
                station: row_station.to_string(),
                date,
                element: element.clone(),
                value,
                quality,
            });
        }
    }

    if records.is_empty() {
        return Err(ParseError::EmptyResponse {
            station: station.to_string(),
        });
    }

    Ok(records)
}

/// Pairs each element column with its `_ATTRIBUTES` companion, if present.
fn element_columns(
    headers: &csv::StringRecord,
    date_col: usize,
    station_col: Option<usize>,
) -> Vec<(usize, Element, Option<usize>)> {
    headers
        .iter()
        .enumerate()
        .filter(|(col, name)| {
            *col != date_col
                && Some(*col) != station_col
                && !name.ends_with("_ATTRIBUTES")
                && !matches!(*name, "NAME" | "LATITUDE" | "LONGITUDE" | "ELEVATION")
        })
        .map(|(col, name)| {
            let attributes_col = headers
                .iter()
                .position(|h| h == format!("{name}_ATTRIBUTES"));
            (col, Element::from_code(name), attributes_col)
        })
        .collect()
}

// Attributes are "measurement,quality,source[,time]"; only the quality flag
// is kept.
fn quality_flag(attributes: &str) -> Option<String> {
    attributes
        .split(',')
        .nth(1)
        .map(str::trim)
        .filter(|flag| !flag.is_empty())
        .map(str::to_string)
}

// -- Tests -------------------------------------------------------------------
