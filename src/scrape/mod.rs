//! Listing data producers that feed the analysis: a search-page scraper and
//! an offline sample generator.
//!
//! Both produce a [`Harvest`] which [`save::save_harvest`] writes into the
//! data directory as `scraped_*.csv` files the calendar loader understands.

pub mod extract;
pub mod sample;
pub mod save;
pub mod search;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

pub use sample::SampleGenerator;
pub use save::{SavedFiles, save_harvest};
pub use search::SearchScraper;

/// One listing as seen on a search page (or generated).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedListing {
    pub listing_id: String,
    pub title: String,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub room_type: Option<String>,
    pub neighbourhood: Option<String>,
    pub location: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub source: String,
}

/// Result of extracting a single listing card.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Listing(ScrapedListing),
    Failed { index: usize, reason: String },
}

/// A calendar row in the layout the analysis reads back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEntry {
    pub listing_id: String,
    pub date: NaiveDate,
    /// Brazilian-formatted, e.g. `R$123,45`.
    pub price: String,
    /// `t` or `f`.
    pub available: &'static str,
}

/// Everything a producer collected in one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Harvest {
    pub listings: Vec<ScrapedListing>,
    pub calendar: Vec<CalendarEntry>,
    /// Cards that could not be turned into a listing.
    pub failed: usize,
}

impl Harvest {
    /// Splits extraction results into listings and a failure count.
    pub fn absorb(&mut self, items: Vec<Extraction>) {
        for item in items {
            match item {
                Extraction::Listing(l) => self.listings.push(l),
                Extraction::Failed { .. } => self.failed += 1,
            }
        }
    }
}

/// Something that can produce listings and calendar rows.
#[async_trait]
pub trait ListingSource: Send {
    /// Short name used in logs and the `source` column.
    fn name(&self) -> &'static str;

    async fn collect(&mut self) -> Result<Harvest>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str) -> ScrapedListing {
        ScrapedListing {
            listing_id: id.to_string(),
            title: "Flat".to_string(),
            price: Some(100.0),
            rating: None,
            room_type: None,
            neighbourhood: None,
            location: None,
            scraped_at: Utc::now(),
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_absorb_counts_failures() {
        let mut harvest = Harvest::default();
        harvest.absorb(vec![
            Extraction::Listing(listing("1")),
            Extraction::Failed {
                index: 1,
                reason: "empty title".into(),
            },
            Extraction::Listing(listing("2")),
        ]);

        assert_eq!(harvest.listings.len(), 2);
        assert_eq!(harvest.failed, 1);
    }
}
