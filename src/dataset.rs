//! Assembles per-station observation records into a (time, station) grid.
//!
//! The grid has a dense daily time axis spanning the union of the per-station
//! effective ranges. Cells with no observation stay `None`; they become null
//! in the output file, never zero.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::errors::ParseError;
use crate::reading::{Element, ObservationRecord, StationMetadata};

/// One station's contribution: its metadata, the effective (clamped) date
/// range, and the records parsed from its data response.
#[derive(Debug, Clone)]
pub struct StationSeries {
    pub metadata: StationMetadata,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub records: Vec<ObservationRecord>,
}

/// The assembled output container, written once and discarded.
///
/// Cell storage is row-major over (time, station): the cell for time index
/// `t` and station index `s` lives at `t * stations.len() + s`.
#[derive(Debug)]
pub struct DailyDataset {
    pub time: Vec<NaiveDate>,
    pub stations: Vec<StationMetadata>,
    pub elements: Vec<Element>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    values: BTreeMap<Element, Vec<Option<f32>>>,
    qualities: BTreeMap<Element, Vec<Option<String>>>,
}

impl DailyDataset {
    /// Builds the grid from one series per station.
    ///
    /// In default mode the variables are exactly the core set; with
    /// `all_variables` they are the union of observed element codes, core
    /// elements first. A record for an unrequested element is dropped; a
    /// second record for the same (station, date, element) cell, or a record
    /// outside the time axis, is a response error.
    pub fn assemble(
        series: Vec<StationSeries>,
        all_variables: bool,
    ) -> Result<Self, ParseError> {
        let start = series
            .iter()
            .map(|s| s.start)
            .min()
            .ok_or_else(|| ParseError::Malformed {
                reason: "no station data to assemble".to_string(),
            })?;
        let end = series.iter().map(|s| s.end).max().unwrap_or(start);

        let time: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
        let elements = element_set(&series, all_variables);

        let num_cells = time.len() * series.len();
        let mut values: BTreeMap<Element, Vec<Option<f32>>> = elements
            .iter()
            .map(|e| (e.clone(), vec![None; num_cells]))
            .collect();
        let mut qualities: BTreeMap<Element, Vec<Option<String>>> = elements
            .iter()
            .map(|e| (e.clone(), vec![None; num_cells]))
            .collect();

        let num_stations = series.len();
        for (station_idx, station_series) in series.iter().enumerate() {
            for record in &station_series.records {
                let Some(time_idx) = day_index(start, end, record.date) else {
                    return Err(ParseError::Malformed {
                        reason: format!(
                            "observation for `{}` on {} falls outside the requested range",
                            record.station, record.date
                        ),
                    });
                };
                let Some(column) = values.get_mut(&record.element) else {
                    continue;
                };

                let cell = time_idx * num_stations + station_idx;
                if column[cell].is_some() {
                    return Err(ParseError::DuplicateRecord {
                        station: record.station.clone(),
                        date: record.date,
                        element: record.element.code().to_string(),
                    });
                }
                column[cell] = Some(record.value);

                if let Some(flag) = &record.quality {
                    if let Some(flags) = qualities.get_mut(&record.element) {
                        flags[cell] = Some(flag.clone());
                    }
                }
            }
        }

        Ok(DailyDataset {
            time,
            stations: series.into_iter().map(|s| s.metadata).collect(),
            elements,
            start,
            end,
            values,
            qualities,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.time.len() * self.stations.len()
    }

    /// Cell values for one variable, row-major over (time, station).
    pub fn values(&self, element: &Element) -> &[Option<f32>] {
        self.values.get(element).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Quality flags for one variable, aligned with [`DailyDataset::values`].
    pub fn quality_flags(&self, element: &Element) -> &[Option<String>] {
        self.qualities
            .get(element)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn element_set(series: &[StationSeries], all_variables: bool) -> Vec<Element> {
    if !all_variables {
        return Element::CORE.to_vec();
    }

    // BTreeSet order puts core elements first, extras alphabetically.
    let observed: BTreeSet<Element> = series
        .iter()
        .flat_map(|s| s.records.iter().map(|r| r.element.clone()))
        .collect();

    observed.into_iter().collect()
}

fn day_index(start: NaiveDate, end: NaiveDate, date: NaiveDate) -> Option<usize> {
    if date < start || date > end {
        return None;
    }

    Some((date - start).num_days() as usize)
}

// -- Tests -------------------------------------------------------------------
