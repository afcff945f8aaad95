//! Persists a [`Harvest`] into the data directory.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::output::write_table;
use crate::scrape::{Harvest, ScrapedListing};

pub const RAW_LISTINGS_FILE: &str = "scraped_listings.csv";
pub const CALENDAR_FILE: &str = "scraped_calendar.csv";
pub const DETAIL_FILE: &str = "scraped_listings_detail.csv";

/// Listing metadata in the layout the listings loader reads back.
///
/// `neighbourhood_cleansed` is either set on every row or on none, so the
/// column is left out entirely when no listing knows its neighbourhood.
#[derive(Debug, Serialize)]
struct DetailRow<'a> {
    id: &'a str,
    name: &'a str,
    room_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    neighbourhood_cleansed: Option<Option<&'a str>>,
    price: Option<f64>,
    rating: Option<f64>,
    scraped_at: DateTime<Utc>,
}

impl<'a> DetailRow<'a> {
    fn new(l: &'a ScrapedListing, with_neighbourhood: bool) -> Self {
        Self {
            id: &l.listing_id,
            name: &l.title,
            room_type: l.room_type.as_deref(),
            neighbourhood_cleansed: with_neighbourhood.then(|| l.neighbourhood.as_deref()),
            price: l.price,
            rating: l.rating,
            scraped_at: l.scraped_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedFiles {
    pub files: Vec<PathBuf>,
}

/// Writes the raw listings, the calendar and the listing details.
///
/// Nothing is written for an empty harvest.
#[tracing::instrument(skip_all, fields(data_dir = %data_dir.display()))]
pub fn save_harvest(harvest: &Harvest, data_dir: &Path) -> Result<SavedFiles> {
    let mut saved = SavedFiles::default();
    if harvest.listings.is_empty() {
        warn!("No listings to save");
        return Ok(saved);
    }

    fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;

    let raw = data_dir.join(RAW_LISTINGS_FILE);
    write_table(&raw, &harvest.listings)?;
    info!(listings = harvest.listings.len(), path = %raw.display(), "Saved listings");
    saved.files.push(raw);

    if !harvest.calendar.is_empty() {
        let path = data_dir.join(CALENDAR_FILE);
        write_table(&path, &harvest.calendar)?;
        info!(entries = harvest.calendar.len(), path = %path.display(), "Created calendar data");
        saved.files.push(path);
    }

    let with_neighbourhood = harvest.listings.iter().any(|l| l.neighbourhood.is_some());
    let details: Vec<DetailRow<'_>> = harvest
        .listings
        .iter()
        .map(|l| DetailRow::new(l, with_neighbourhood))
        .collect();
    let path = data_dir.join(DETAIL_FILE);
    write_table(&path, &details)?;
    info!(listings = details.len(), path = %path.display(), "Created detailed listings data");
    saved.files.push(path);

    Ok(saved)
}
