//! CLI entry point for the rental price statistics tool.
//!
//! Provides subcommands for analysing calendar prices over a date window,
//! scraping search results into calendar files, and generating sample data.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rental_price_stats::analyzers::analyzer::{AnalysisOutcome, analyze};
use rental_price_stats::config::{AnalysisConfig, DEFAULT_LOCATION, SampleConfig, ScrapeConfig};
use rental_price_stats::error::exit_code_for;
use rental_price_stats::scrape::{ListingSource, SampleGenerator, SearchScraper, save_harvest};
use rental_price_stats::window::DateWindow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "rental_price_stats")]
#[command(about = "Price statistics for short-term-rental calendars", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute price statistics for a date window
    Analyze {
        /// Folder with calendar/listings CSVs
        #[arg(short, long, env = "PRICE_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,

        /// Folder to write CSV tables and charts into
        #[arg(short, long, env = "PRICE_OUTPUT_DIR", default_value = "output")]
        output_dir: PathBuf,

        /// Start date YYYY-MM-DD (defaults to Oct 1 of the current year)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date YYYY-MM-DD (defaults to Nov 30 of the current year)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Compute stats only on booked nights (available == false)
        #[arg(long, default_value_t = false)]
        only_booked: bool,
    },
    /// Scrape search results into scraped_*.csv files
    Scrape {
        /// Location to search for listings
        #[arg(short, long, default_value = DEFAULT_LOCATION)]
        location: String,

        /// Check-in date YYYY-MM-DD (defaults to Oct 1 of the current year)
        #[arg(long)]
        checkin: Option<NaiveDate>,

        /// Check-out date YYYY-MM-DD (defaults to Nov 30 of the current year)
        #[arg(long)]
        checkout: Option<NaiveDate>,

        /// Number of adults for the search
        #[arg(long, default_value_t = 1)]
        adults: u32,

        /// Maximum pages to scrape
        #[arg(long, default_value_t = 3)]
        max_pages: usize,

        /// Folder to save scraped CSVs into
        #[arg(short, long, env = "PRICE_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,

        /// Minimum pause between requests, in milliseconds
        #[arg(long, default_value_t = 2000)]
        min_delay_ms: u64,

        /// Maximum pause between requests, in milliseconds
        #[arg(long, default_value_t = 5000)]
        max_delay_ms: u64,

        /// Per-request timeout, in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Generate sample listings and calendar data without any network access
    Sample {
        /// Location recorded on the generated listings
        #[arg(short, long, default_value = DEFAULT_LOCATION)]
        location: String,

        /// Number of "pages" to generate, 10 listings each
        #[arg(short, long, default_value_t = 2)]
        pages: usize,

        /// Output directory
        #[arg(short, long, env = "PRICE_DATA_DIR", default_value = "data")]
        output: PathBuf,

        /// Seed for reproducible data
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = match init_tracing() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialise logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_tracing() -> Result<WorkerGuard> {
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/rental_price_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("rental_price_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .try_init()?;

    Ok(file_guard)
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Analyze {
            data_dir,
            output_dir,
            start,
            end,
            only_booked,
        } => {
            let config = AnalysisConfig {
                data_dir,
                output_dir,
                window: DateWindow::from_bounds(start, end, today),
                only_booked,
            };

            match analyze(&config)? {
                AnalysisOutcome::EmptyWindow => info!("Nothing to write"),
                AnalysisOutcome::Written(report) => {
                    for file in &report.files {
                        info!(path = %file.display(), "Output written");
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Scrape {
            location,
            checkin,
            checkout,
            adults,
            max_pages,
            data_dir,
            min_delay_ms,
            max_delay_ms,
            timeout_secs,
        } => {
            warn!("Scraping for educational use only; respect robots.txt and the site's terms of service");

            let default_window = DateWindow::default_for(today);
            let window = DateWindow::new(
                checkin.unwrap_or(default_window.start),
                checkout.unwrap_or(default_window.end),
            );

            let mut config = ScrapeConfig::new(location, window);
            config.adults = adults;
            config.max_pages = max_pages;
            config.delay = Duration::from_millis(min_delay_ms)..=Duration::from_millis(max_delay_ms);
            config.request_timeout = Duration::from_secs(timeout_secs);

            let mut scraper = SearchScraper::from_config(config)?;
            collect_and_save(&mut scraper, &data_dir).await
        }
        Commands::Sample {
            location,
            pages,
            output,
            seed,
        } => {
            let config = SampleConfig {
                location,
                pages,
                seed,
                window: DateWindow::default_for(today),
            };

            let mut generator = SampleGenerator::new(config);
            collect_and_save(&mut generator, &output).await
        }
    }
}

/// Runs a listing source and saves what it produced into `data_dir`.
#[tracing::instrument(skip_all, fields(source = source.name(), data_dir = %data_dir.display()))]
async fn collect_and_save(source: &mut dyn ListingSource, data_dir: &Path) -> Result<ExitCode> {
    let harvest = source.collect().await?;

    if harvest.listings.is_empty() {
        error!(
            failed = harvest.failed,
            "No listings were collected. Check the search parameters and try again."
        );
        return Ok(ExitCode::FAILURE);
    }

    let saved = save_harvest(&harvest, data_dir)?;
    info!(
        listings = harvest.listings.len(),
        failed = harvest.failed,
        files = saved.files.len(),
        "Collection completed"
    );
    info!(
        "Run the analysis on this data with: rental_price_stats analyze --data-dir {}",
        data_dir.display()
    );
    Ok(ExitCode::SUCCESS)
}
