//! GHCND element codes.

use std::fmt;

/// Represents the type of measurement. See the
/// [GHCND documentation](https://www.ncei.noaa.gov/pub/data/cdo/documentation/GHCND_documentation.pdf)
/// for the full element list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    Prcp,
    Snow,
    Snwd,
    Tmax,
    Tmin,
    Other(String),
}

impl Element {
    /// The core set, in output column order.
    pub const CORE: [Element; 5] = [
        Element::Prcp,
        Element::Snow,
        Element::Snwd,
        Element::Tmax,
        Element::Tmin,
    ];

    pub fn from_code(code: &str) -> Self {
        match code {
            "PRCP" => Element::Prcp,
            "SNOW" => Element::Snow,
            "SNWD" => Element::Snwd,
            "TMAX" => Element::Tmax,
            "TMIN" => Element::Tmin,
            other => Element::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Element::Prcp => "PRCP",
            Element::Snow => "SNOW",
            Element::Snwd => "SNWD",
            Element::Tmax => "TMAX",
            Element::Tmin => "TMIN",
            Element::Other(code) => code,
        }
    }

    /// Lowercase name used for the output column.
    pub fn column_name(&self) -> String {
        self.code().to_lowercase()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_round_trip_codes() {
        for code in ["PRCP", "SNOW", "SNWD", "TMAX", "TMIN", "TOBS"] {
            assert_eq!(Element::from_code(code).code(), code);
        }
    }

    #[test]
    fn should_map_unknown_codes_to_other() {
        assert_eq!(
            Element::from_code("AWND"),
            Element::Other("AWND".to_string())
        );
    }

    #[test]
    fn should_sort_core_before_other() {
        let mut elements = vec![
            Element::Other("AWND".to_string()),
            Element::Tmin,
            Element::Prcp,
        ];
        elements.sort();

        assert_eq!(
            elements,
            vec![
                Element::Prcp,
                Element::Tmin,
                Element::Other("AWND".to_string())
            ]
        );
    }

    #[test]
    fn should_lowercase_column_name() {
        assert_eq!(Element::Tmax.column_name(), "tmax");
        assert_eq!(Element::Other("AWND".to_string()).column_name(), "awnd");
    }
}
