//! Station metadata and coverage from the search endpoint's JSON response.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::ParseError;
use crate::reading::Element;

/// Station identity and coordinates, attached to the output file as global
/// attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct StationMetadata {
    pub id: String,
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
}

impl StationMetadata {
    /// Serialises to `station:<id>:<field>` attribute pairs. Numeric fields
    /// use the shortest round-tripping decimal form, so
    /// [`StationMetadata::from_attrs`] recovers the values exactly.
    pub fn to_attrs(&self) -> Vec<(String, String)> {
        let key = |field: &str| format!("station:{}:{}", self.id, field);

        let mut attrs = vec![
            (key("latitude"), self.latitude.to_string()),
            (key("longitude"), self.longitude.to_string()),
        ];
        if let Some(name) = &self.name {
            attrs.push((key("name"), name.clone()));
        }
        if let Some(elevation) = self.elevation {
            attrs.push((key("elevation"), elevation.to_string()));
        }

        attrs
    }

    /// Rebuilds the metadata for `id` from attribute pairs, if present.
    pub fn from_attrs(id: &str, attrs: &HashMap<String, String>) -> Option<Self> {
        let get = |field: &str| attrs.get(&format!("station:{id}:{field}"));

        let elevation = match get("elevation") {
            Some(text) => Some(text.parse().ok()?),
            None => None,
        };

        Some(StationMetadata {
            id: id.to_string(),
            name: get("name").cloned(),
            latitude: get("latitude")?.parse().ok()?,
            longitude: get("longitude")?.parse().ok()?,
            elevation,
        })
    }
}

/// What the search endpoint reports a station holds: its metadata, the
/// available data types, and the period of record.
#[derive(Debug, Clone)]
pub struct StationCoverage {
    pub metadata: StationMetadata,
    pub data_types: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl StationCoverage {
    /// Extracts coverage from a search response. `Ok(None)` means the search
    /// matched nothing, which the caller disambiguates (unknown station vs
    /// empty date range).
    pub fn from_search(
        station: &str,
        response: &SearchResponse,
    ) -> Result<Option<Self>, ParseError> {
        let Some(result) = response.results.first() else {
            return Ok(None);
        };

        let coordinates = &result.location.coordinates;
        if coordinates.len() < 2 {
            return Err(ParseError::Malformed {
                reason: format!(
                    "location of `{station}` has {} coordinates, expected [lon, lat]",
                    coordinates.len()
                ),
            });
        }

        let metadata = StationMetadata {
            id: station.to_string(),
            name: result.name.clone(),
            longitude: coordinates[0],
            latitude: coordinates[1],
            elevation: coordinates.get(2).copied(),
        };

        Ok(Some(StationCoverage {
            metadata,
            data_types: result.data_types.iter().map(|d| d.id.clone()).collect(),
            start: parse_api_date(&result.start_date)?,
            end: parse_api_date(&result.end_date)?,
        }))
    }

    /// Clamps a requested range to the station's period of record.
    pub fn clamp(&self, start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
        (start.max(self.start), end.min(self.end))
    }

    /// Core elements the station reports, in output column order.
    pub fn available_core(&self) -> Vec<Element> {
        Element::CORE
            .iter()
            .filter(|e| self.has_data_type(e))
            .cloned()
            .collect()
    }

    /// Core elements the station does not report.
    pub fn missing_core(&self) -> Vec<Element> {
        Element::CORE
            .iter()
            .filter(|e| !self.has_data_type(e))
            .cloned()
            .collect()
    }

    fn has_data_type(&self, element: &Element) -> bool {
        self.data_types.iter().any(|d| d == element.code())
    }
}

/// Search endpoint response body.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data_types: Vec<DataTypeEntry>,
    pub location: Location,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
pub struct DataTypeEntry {
    pub id: String,
}

/// GeoJSON-style point: `[longitude, latitude, elevation?]`.
#[derive(Debug, Deserialize)]
pub struct Location {
    pub coordinates: Vec<f64>,
}

// Period-of-record dates arrive as "1893-01-01T00:00:00".
fn parse_api_date(text: &str) -> Result<NaiveDate, ParseError> {
    let date_part = text.split('T').next().unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| ParseError::Malformed {
        reason: format!("unparseable period-of-record date `{text}`"),
    })
}

// -- Tests -------------------------------------------------------------------
