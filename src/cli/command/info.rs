//! Report station information without retrieving data.

use crate::{download::NceiClient, errors::Result, query, request::StationRequest};

pub async fn info(request: &StationRequest) -> Result<()> {
    let client = NceiClient::new()?;

    for station in &request.stations {
        let coverage = client.lookup(station, request.start, request.end).await?;
        let (start, end) = coverage.clamp(request.start, request.end);
        let available: Vec<String> = coverage
            .available_core()
            .iter()
            .map(|e| e.code().to_string())
            .collect();

        println!("Station: {station}");
        if let Some(name) = &coverage.metadata.name {
            println!("Name: {name}");
        }
        println!("Variables: {}", available.join(", "));
        println!("Longitude: {}", coverage.metadata.longitude);
        println!("Latitude: {}", coverage.metadata.latitude);
        if let Some(elevation) = coverage.metadata.elevation {
            println!("Elevation: {elevation}");
        }
        println!("Start date: {start}");
        println!("End date: {end}");
        println!("Site URL: {}", query::station_page_url(station));
    }

    Ok(())
}
