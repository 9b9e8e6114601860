//! Retrieve daily observations and save them to a parquet file.

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::info;

use crate::{
    cli::create_spinner,
    dataset::{DailyDataset, StationSeries},
    download::NceiClient,
    errors::{ParseError, Result},
    parquet,
    reading::parse_daily_csv,
    request::StationRequest,
};

use super::make_output_file_name;

pub async fn fetch(request: &StationRequest) -> Result<String> {
    let client = NceiClient::new()?;

    let bar = create_spinner(format!(
        "Retrieving data for {} station(s)...",
        request.stations.len()
    ));
    let tasks: Vec<_> = request
        .stations
        .iter()
        .map(|station| {
            let client = client.clone();
            let station = station.clone();
            let (start, end) = (request.start, request.end);
            let all_variables = request.all_variables;

            tokio::spawn(async move {
                fetch_station(client, station, start, end, all_variables).await
            })
        })
        .collect();

    // join_all preserves input order, so the series stay aligned with the
    // requested station order.
    let mut series = Vec::with_capacity(tasks.len());
    for result in join_all(tasks).await {
        series.push(result??);
    }
    let observations: usize = series.iter().map(|s: &StationSeries| s.records.len()).sum();
    bar.finish_with_message(format!("Retrieved {observations} observations"));

    let dataset = DailyDataset::assemble(series, request.all_variables)?;
    let file_name =
        make_output_file_name(&request.path, &request.stations, dataset.start, dataset.end);
    parquet::save_daily(&dataset, &file_name)?;

    Ok(file_name.to_string_lossy().to_string())
}

async fn fetch_station(
    client: NceiClient,
    station: String,
    start: NaiveDate,
    end: NaiveDate,
    all_variables: bool,
) -> Result<StationSeries> {
    let coverage = client.lookup(&station, start, end).await?;

    if !all_variables {
        if coverage.available_core().is_empty() {
            return Err(ParseError::NoCoreElements { station }.into());
        }
        let missing = coverage.missing_core();
        if !missing.is_empty() {
            let codes: Vec<&str> = missing.iter().map(|e| e.code()).collect();
            println!(
                "Elements {} not available at {station} for dates {start}-{end}",
                codes.join(", ")
            );
        }
    }

    let (effective_start, effective_end) = coverage.clamp(start, end);
    if effective_start != start {
        info!("adjusted start date to {effective_start} at {station} based on available data");
    }
    if effective_end != end {
        info!("adjusted end date to {effective_end} at {station} based on available data");
    }

    let body = client
        .daily_csv(&station, effective_start, effective_end, all_variables)
        .await?;
    let records = parse_daily_csv(&station, &body)?;
    info!("{station}: {} observations", records.len());

    Ok(StationSeries {
        metadata: coverage.metadata,
        start: effective_start,
        end: effective_end,
        records,
    })
}
