pub mod fetch;
pub mod info;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

pub use fetch::fetch;
pub use info::info;

use crate::query;

/// Builds the output file name from the station list and the effective
/// date range.
pub fn make_output_file_name(
    path: &Path,
    stations: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> PathBuf {
    let file_name = format!(
        "{}_{}_{}_{}.parquet",
        stations.join("-"),
        query::DATASET,
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d"),
    );

    path.join(file_name)
}

// -- Tests -------------------------------------------------------------------
