//! Command line interface.

pub mod command;

use std::path::PathBuf;
use std::time::Duration;

use clap::{command, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Retrieve daily summaries from the NCEI data service API and save to file", long_about = None)]
pub struct Cli {
    /// NCEI station ID (repeat, or separate multiple stations with commas)
    #[arg(required = true)]
    pub stations: Vec<String>,

    /// Get station information only, without retrieving data
    #[arg(short, long)]
    pub info: bool,

    /// Retrieve every variable the station reports instead of the core set
    #[arg(short, long)]
    pub all_variables: bool,

    /// Start date in YYYY-MM-DD format (default: 1750-01-01)
    #[arg(short, long)]
    pub start: Option<String>,

    /// End date in YYYY-MM-DD format (default: today)
    #[arg(short, long)]
    pub end: Option<String>,

    /// Directory for the saved file
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,
}

/// Initialises tracing. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ghcnd=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    ProgressBar::new(size).with_message(message).with_style(
        ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    )
}

// -- Tests -------------------------------------------------------------------
