//! Explicit run configuration handed to each component.
//!
//! Built once in `main` from CLI arguments (which may themselves come from the
//! environment or a `.env` file) and passed down by reference.

use chrono::NaiveDate;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use crate::window::DateWindow;

/// Default search location for the scraper and the sample generator.
pub const DEFAULT_LOCATION: &str = "Belém, PA";

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub window: DateWindow,
    pub only_booked: bool,
}

impl AnalysisConfig {
    pub fn charts_dir(&self) -> PathBuf {
        self.output_dir.join("charts")
    }
}

/// Parameters for the search-page scraper.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub location: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub adults: u32,
    pub max_pages: usize,
    /// Courtesy pause between requests, picked uniformly from this range.
    pub delay: RangeInclusive<Duration>,
    pub request_timeout: Duration,
}

impl ScrapeConfig {
    pub fn new(location: impl Into<String>, window: DateWindow) -> Self {
        Self {
            location: location.into(),
            checkin: window.start,
            checkout: window.end,
            adults: 1,
            max_pages: 3,
            delay: Duration::from_secs(2)..=Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Parameters for the offline sample-data generator.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub location: String,
    pub pages: usize,
    /// Fixed seed for reproducible output; random when `None`.
    pub seed: Option<u64>,
    /// Calendar days are generated for this window.
    pub window: DateWindow,
}

impl SampleConfig {
    pub const LISTINGS_PER_PAGE: usize = 10;

    pub fn listing_count(&self) -> usize {
        self.pages * Self::LISTINGS_PER_PAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_config_defaults_follow_window() {
        let start = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        let cfg = ScrapeConfig::new(DEFAULT_LOCATION, DateWindow::new(start, end));

        assert_eq!(cfg.checkin, start);
        assert_eq!(cfg.checkout, end);
        assert_eq!(cfg.max_pages, 3);
        assert!(cfg.delay.start() <= cfg.delay.end());
    }

    #[test]
    fn test_sample_listing_count() {
        let window = DateWindow::default_for(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let cfg = SampleConfig {
            location: DEFAULT_LOCATION.into(),
            pages: 2,
            seed: Some(7),
            window,
        };
        assert_eq!(cfg.listing_count(), 20);
    }

    #[test]
    fn test_charts_dir() {
        let window = DateWindow::default_for(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let cfg = AnalysisConfig {
            data_dir: "data".into(),
            output_dir: "out".into(),
            window,
            only_booked: false,
        };
        assert_eq!(cfg.charts_dir(), PathBuf::from("out/charts"));
    }
}
