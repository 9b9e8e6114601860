//! `ghcnd` CLI entrypoint: parse arguments, run the retrieval pipeline, and
//! exit non-zero on any failure.

mod cli;
mod dataset;
mod download;
mod errors;
mod parquet;
mod query;
mod reading;
mod request;

use std::process;

use clap::Parser;

use cli::Cli;
use errors::Result;
use request::StationRequest;

#[tokio::main]
async fn main() {
    cli::init_logging();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let request = StationRequest::from_cli(&cli)?;

    if request.info_only {
        cli::command::info(&request).await
    } else {
        let file_name = cli::command::fetch(&request).await?;
        println!("File saved to `{file_name}`");
        Ok(())
    }
}
