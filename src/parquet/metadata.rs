//! CF-style attribute tables attached to the output file's Arrow schema.

use std::collections::HashMap;

use chrono::Local;

use crate::dataset::DailyDataset;
use crate::query;
use crate::reading::Element;

/// Attributes for one variable field: units, standard name, long name, and
/// cell methods for the core set; a long name only for anything else.
pub fn variable_attrs(element: &Element) -> HashMap<String, String> {
    let attrs: &[(&str, &str)] = match element {
        Element::Tmin => &[
            ("units", "degrees Celsius"),
            ("standard_name", "air_temperature"),
            ("long_name", "daily minimum air temperature"),
            ("cell_methods", "time: minimum (interval: 1 day)"),
        ],
        Element::Tmax => &[
            ("units", "degrees Celsius"),
            ("standard_name", "air_temperature"),
            ("long_name", "daily maximum air temperature"),
            ("cell_methods", "time: maximum (interval: 1 day)"),
        ],
        Element::Prcp => &[
            ("units", "mm"),
            ("standard_name", "lwe_thickness_of_precipitation_amount"),
            ("long_name", "daily total precipitation"),
            ("cell_methods", "time: sum (interval: 1 day)"),
        ],
        Element::Snow => &[
            ("units", "mm"),
            ("standard_name", "thickness_of_snowfall_amount"),
            ("long_name", "daily total snowfall"),
            ("cell_methods", "time: sum (interval: 1 day)"),
        ],
        Element::Snwd => &[
            ("units", "mm"),
            ("standard_name", "surface_snow_thickness"),
            ("long_name", "daily snow depth"),
            ("cell_methods", "time: point"),
        ],
        Element::Other(code) => {
            return HashMap::from([("long_name".to_string(), format!("GHCND element {code}"))])
        }
    };

    attrs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Global provenance attributes plus one attribute group per station.
pub fn global_attrs(dataset: &DailyDataset) -> HashMap<String, String> {
    let station_ids: Vec<&str> = dataset.stations.iter().map(|s| s.id.as_str()).collect();

    let mut attrs = HashMap::from([
        ("Conventions".to_string(), "CF-1.8".to_string()),
        ("dataset".to_string(), query::DATASET.to_string()),
        ("stations".to_string(), station_ids.join(",")),
        (
            "start_date".to_string(),
            dataset.start.format("%Y-%m-%d").to_string(),
        ),
        (
            "end_date".to_string(),
            dataset.end.format("%Y-%m-%d").to_string(),
        ),
        (
            "accessed".to_string(),
            Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        ),
        (
            "access_method".to_string(),
            "NCEI Data Service API (https://www.ncei.noaa.gov/support/access-data-service-api-user-documentation)"
                .to_string(),
        ),
    ]);
    for station in &dataset.stations {
        attrs.extend(station.to_attrs());
    }

    attrs
}

// -- Tests -------------------------------------------------------------------
