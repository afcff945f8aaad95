use anyhow::{Context, Result};
use std::fs;
use tracing::{error, info, warn};

use crate::analyzers::aggregate::aggregate_window;
use crate::analyzers::types::AggregationResult;
use crate::calendar::load_calendar;
use crate::chart::{BOX_CHART_FILE, DAILY_CHART_FILE, render_box_chart, render_daily_chart};
use crate::config::AnalysisConfig;
use crate::listings::load_listings_optional;
use crate::output::{Report, print_json, print_pretty, write_report};

/// How an analysis run ended.
#[derive(Debug)]
pub enum AnalysisOutcome {
    /// No calendar rows fell inside the window; nothing was written.
    EmptyWindow,
    Written(Report),
}

/// Runs the whole pipeline: load, normalize, filter, aggregate, write.
#[tracing::instrument(skip_all, fields(window = %config.window, only_booked = config.only_booked))]
pub fn analyze(config: &AnalysisConfig) -> Result<AnalysisOutcome> {
    let calendar = load_calendar(&config.data_dir)?;

    let rows = config.window.filter(calendar.rows, config.only_booked);
    if rows.is_empty() {
        warn!(
            start = %config.window.start,
            end = %config.window.end,
            "No calendar rows found in window"
        );
        return Ok(AnalysisOutcome::EmptyWindow);
    }
    info!(rows = rows.len(), "Calendar rows in window");

    let listings = load_listings_optional(&config.data_dir)?;
    let result = aggregate_window(&config.window, &rows, listings.as_ref());
    print_pretty(&result.overall);
    print_json(&result.overall)?;

    let mut report = write_report(&config.output_dir, &result)?;
    report.files.extend(write_charts(config, &result));

    info!(
        output_dir = %report.output_dir.display(),
        files = report.files.len(),
        "Saved outputs"
    );
    Ok(AnalysisOutcome::Written(report))
}

/// Renders both charts. Failures are logged, never returned.
fn write_charts(config: &AnalysisConfig, result: &AggregationResult) -> Vec<std::path::PathBuf> {
    let charts_dir = config.charts_dir();
    if let Err(e) = fs::create_dir_all(&charts_dir)
        .with_context(|| format!("creating {}", charts_dir.display()))
    {
        error!(error = %e, "Skipping charts");
        return Vec::new();
    }

    let mut written = Vec::new();

    let daily_path = charts_dir.join(DAILY_CHART_FILE);
    match render_daily_chart(&result.daily, &daily_path) {
        Ok(()) => written.push(daily_path),
        Err(e) => warn!(error = %e, "Daily price chart not rendered"),
    }

    let box_path = charts_dir.join(BOX_CHART_FILE);
    match render_box_chart(&result.prices, &box_path) {
        Ok(()) => written.push(box_path),
        Err(e) => warn!(error = %e, "Price distribution chart not rendered"),
    }

    written
}
