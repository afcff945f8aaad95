//! Output formatting and persistence for aggregation results.
//!
//! Every table lands in its own CSV file so a missing breakdown never affects
//! the others.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::types::{AggregationResult, CategoryPrice, OverallSummary};

pub const SUMMARY_FILE: &str = "prices_summary.csv";
pub const DAILY_FILE: &str = "daily_avg_price.csv";
pub const LISTING_FILE: &str = "listing_avg_price_oct_nov.csv";
pub const ROOM_TYPE_FILE: &str = "price_roomtype.csv";
pub const NEIGHBOURHOOD_FILE: &str = "price_neighbourhood.csv";

/// Files written by one successful run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Logs the overall summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &OverallSummary) {
    debug!("{:#?}", summary);
}

/// Logs the overall summary as pretty-printed JSON.
pub fn print_json(summary: &OverallSummary) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Writes `rows` to a fresh CSV file at `path`, header first.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV table");

    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes a category breakdown, naming the key column after the category
/// (`room_type`, `neighbourhood`).
pub fn write_category_table(path: &Path, key: &str, rows: &[CategoryPrice]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing category table");

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([key, "listings", "nights", "mean_price", "median_price"])?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes every non-empty table of `result` into `output_dir`.
#[tracing::instrument(skip_all, fields(output_dir = %output_dir.display()))]
pub fn write_report(output_dir: &Path, result: &AggregationResult) -> Result<Report> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let mut report = Report {
        output_dir: output_dir.to_path_buf(),
        files: Vec::new(),
    };

    let summary = output_dir.join(SUMMARY_FILE);
    write_table(&summary, std::slice::from_ref(&result.overall))?;
    report.files.push(summary);

    if !result.daily.is_empty() {
        let path = output_dir.join(DAILY_FILE);
        write_table(&path, &result.daily)?;
        report.files.push(path);
    }

    if !result.per_listing.is_empty() {
        let path = output_dir.join(LISTING_FILE);
        write_table(&path, &result.per_listing)?;
        report.files.push(path);
    }

    for (rows, file, key) in [
        (&result.room_type, ROOM_TYPE_FILE, "room_type"),
        (&result.neighbourhood, NEIGHBOURHOOD_FILE, "neighbourhood"),
    ] {
        if let Some(rows) = rows.as_ref().filter(|r| !r.is_empty()) {
            let path = output_dir.join(file);
            write_category_table(&path, key, rows)?;
            report.files.push(path);
        }
    }

    info!(files = report.files.len(), "CSV tables written");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{DailyPrice, ListingPrice};
    use crate::calendar::ListingId;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn result() -> AggregationResult {
        AggregationResult {
            overall: OverallSummary {
                period_start: date(1),
                period_end: date(31),
                listings_active: 1,
                nights: 2,
                mean_price: Some(150.0),
                median_price: Some(150.0),
                p25_price: Some(125.0),
                p75_price: Some(175.0),
            },
            daily: vec![DailyPrice {
                date: date(1),
                avg_price: Some(100.0),
                median_price: Some(100.0),
                observations: 1,
            }],
            per_listing: vec![ListingPrice {
                listing_id: ListingId::from("L1"),
                nights: 2,
                mean_price: Some(150.0),
                median_price: Some(150.0),
                p25: Some(125.0),
                p75: Some(175.0),
            }],
            room_type: None,
            neighbourhood: Some(vec![CategoryPrice {
                category: None,
                listings: 1,
                nights: 2,
                mean_price: None,
                median_price: None,
            }]),
            prices: vec![100.0, 200.0],
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&result().overall);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&result().overall).unwrap();
    }

    #[test]
    fn test_write_report_skips_missing_tables() {
        let dir = tempfile::tempdir().unwrap();
        let report = write_report(dir.path(), &result()).unwrap();

        assert_eq!(report.files.len(), 4);
        assert!(dir.path().join(SUMMARY_FILE).exists());
        assert!(dir.path().join(DAILY_FILE).exists());
        assert!(dir.path().join(LISTING_FILE).exists());
        assert!(!dir.path().join(ROOM_TYPE_FILE).exists());
        assert!(dir.path().join(NEIGHBOURHOOD_FILE).exists());
    }

    #[test]
    fn test_summary_header_and_row() {
        let dir = tempfile::tempdir().unwrap();
        write_report(dir.path(), &result()).unwrap();

        let content = fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines[0],
            "period_start,period_end,listings_active,nights,mean_price,median_price,p25_price,p75_price"
        );
        assert_eq!(lines[1], "2025-10-01,2025-10-31,1,2,150.0,150.0,125.0,175.0");
    }

    #[test]
    fn test_category_table_names_key_column() {
        let dir = tempfile::tempdir().unwrap();
        write_report(dir.path(), &result()).unwrap();

        let content = fs::read_to_string(dir.path().join(NEIGHBOURHOOD_FILE)).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "neighbourhood,listings,nights,mean_price,median_price");
        // null category and null prices become empty cells
        assert_eq!(lines[1], ",1,2,,");
    }

    #[test]
    fn test_write_table_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let rows = result().daily;

        write_table(&path, &rows).unwrap();
        write_table(&path, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
