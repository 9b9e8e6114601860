//! Typed views of the NCEI data service responses.

pub mod element;
pub mod observation;
pub mod station;

pub use element::Element;
pub use observation::{parse_daily_csv, ObservationRecord};
pub use station::{SearchResponse, StationCoverage, StationMetadata};
