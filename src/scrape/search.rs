//! Search-results scraper: walks result pages for a location and date range.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ScrapeConfig;
use crate::fetch::{BasicClient, BrowserHeaders, HttpClient, fetch_text};
use crate::parser::format_brl;
use crate::scrape::extract::{SCRAPER_SOURCE, Selectors, extract_page};
use crate::scrape::{CalendarEntry, Harvest, ListingSource};

pub const SEARCH_BASE_URL: &str = "https://www.airbnb.com/s/";

/// Listings per results page, used for the `items_offset` parameter.
pub const PAGE_SIZE: usize = 20;

/// Builds the results URL for zero-based `page`.
pub fn search_url(config: &ScrapeConfig, page: usize) -> Result<Url> {
    let mut params = vec![
        ("query", config.location.clone()),
        ("checkin", config.checkin.format("%Y-%m-%d").to_string()),
        ("checkout", config.checkout.format("%Y-%m-%d").to_string()),
        ("adults", config.adults.to_string()),
        ("source", "structured_search_input_header".to_string()),
        ("search_type", "autocomplete_click".to_string()),
    ];
    if page > 0 {
        params.push(("items_offset", (page * PAGE_SIZE).to_string()));
    }
    Ok(Url::parse_with_params(SEARCH_BASE_URL, &params)?)
}

pub struct SearchScraper<C> {
    client: C,
    config: ScrapeConfig,
    selectors: Selectors,
    rng: ChaCha8Rng,
}

impl SearchScraper<BrowserHeaders<BasicClient>> {
    /// Scraper over a real HTTP client with browser headers.
    pub fn from_config(config: ScrapeConfig) -> Result<Self> {
        let client = BrowserHeaders::new(BasicClient::with_timeout(config.request_timeout)?);
        Self::new(client, config)
    }
}

impl<C: HttpClient> SearchScraper<C> {
    pub fn new(client: C, config: ScrapeConfig) -> Result<Self> {
        Ok(Self {
            client,
            config,
            selectors: Selectors::new()?,
            rng: ChaCha8Rng::from_entropy(),
        })
    }

    /// Random courtesy pause within the configured delay range.
    async fn pause(&mut self) {
        let delay = pick_delay(&mut self.rng, self.config.delay.start(), self.config.delay.end());
        debug!(delay_ms = delay.as_millis() as u64, "Pausing between requests");
        tokio::time::sleep(delay).await;
    }

    #[tracing::instrument(skip(self), fields(location = %self.config.location))]
    async fn scrape_pages(&mut self) -> Result<Harvest> {
        let max_pages = self.config.max_pages;
        let mut harvest = Harvest::default();

        info!(
            checkin = %self.config.checkin,
            checkout = %self.config.checkout,
            max_pages,
            "Starting search scrape"
        );

        for page in 0..max_pages {
            let url = search_url(&self.config, page)?;
            info!(page = page + 1, max_pages, url = %url, "Scraping page");

            let fetched = fetch_text(&self.client, url.as_str()).await;
            // every request is followed by a pause, failed ones included
            self.pause().await;
            let html = match fetched {
                Ok(html) => html,
                Err(e) => {
                    warn!(page = page + 1, error = %e, "Page fetch failed, skipping");
                    continue;
                }
            };

            let extraction = extract_page(&html, &self.selectors, page * PAGE_SIZE);
            if extraction.items.is_empty() {
                warn!(page = page + 1, "No listing cards on page");
                continue;
            }

            let before = (harvest.listings.len(), harvest.failed);
            harvest.absorb(extraction.items);
            info!(
                page = page + 1,
                listings = harvest.listings.len() - before.0,
                failed = harvest.failed - before.1,
                "Page extracted"
            );

            if !extraction.has_next {
                info!("No more pages available");
                break;
            }
            self.pause().await;
        }

        harvest.calendar = calendar_for_today(&harvest);
        info!(
            listings = harvest.listings.len(),
            failed = harvest.failed,
            "Search scrape finished"
        );
        Ok(harvest)
    }
}

#[async_trait]
impl<C: HttpClient> ListingSource for SearchScraper<C> {
    fn name(&self) -> &'static str {
        SCRAPER_SOURCE
    }

    async fn collect(&mut self) -> Result<Harvest> {
        self.scrape_pages().await
    }
}

/// Uniform pick in `[min, max]`; a reversed range is treated as `[max, min]`.
pub fn pick_delay<R: Rng>(rng: &mut R, min: &Duration, max: &Duration) -> Duration {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let ms = rng.gen_range(lo.as_millis() as u64..=hi.as_millis() as u64);
    Duration::from_millis(ms)
}

/// One available calendar night, dated today, per listing that has a price.
fn calendar_for_today(harvest: &Harvest) -> Vec<CalendarEntry> {
    let today = Local::now().date_naive();
    harvest
        .listings
        .iter()
        .filter_map(|l| {
            l.price.map(|p| CalendarEntry {
                listing_id: l.listing_id.clone(),
                date: today,
                price: format_brl(p),
                available: "t",
            })
        })
        .collect()
}
