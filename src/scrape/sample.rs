//! Offline sample data: plausible Belém listings and a calendar for them,
//! no network involved.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::config::SampleConfig;
use crate::parser::format_brl;
use crate::scrape::{CalendarEntry, Harvest, ListingSource, ScrapedListing};

pub const SAMPLE_SOURCE: &str = "simple_scraper_sample";

/// (title, neighbourhood) pairs the generator draws from.
const TITLES: &[(&str, &str)] = &[
    ("Apartamento aconchegante no centro de Belém", "Campina"),
    ("Casa moderna próxima ao Ver-o-Peso", "Campina"),
    ("Loft com vista para a Baía do Guajará", "Cidade Velha"),
    ("Quarto privativo em Nazaré", "Nazaré"),
    ("Casa completa em Icoaraci", "Icoaraci"),
    ("Apartamento no Umarizal", "Umarizal"),
    ("Suíte confortável em Batista Campos", "Batista Campos"),
    ("Casa de praia em Mosqueiro", "Mosqueiro"),
    ("Flat no Reduto", "Reduto"),
    ("Chalé rústico em Outeiro", "Outeiro"),
];

const ROOM_TYPES: &[&str] = &["Casa inteira", "Quarto inteiro", "Quarto compartilhado"];

pub struct SampleGenerator {
    config: SampleConfig,
    rng: ChaCha8Rng,
}

impl SampleGenerator {
    pub fn new(config: SampleConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { config, rng }
    }

    fn listing(&mut self, n: usize) -> ScrapedListing {
        let (title, neighbourhood) = *TITLES.choose(&mut self.rng).unwrap_or(&TITLES[0]);
        let room_type = *ROOM_TYPES.choose(&mut self.rng).unwrap_or(&ROOM_TYPES[0]);

        ScrapedListing {
            listing_id: format!("sample_{n}"),
            title: title.to_string(),
            price: Some(self.rng.gen_range(80.0..400.0)),
            rating: Some(self.rng.gen_range(3.5..5.0)),
            room_type: Some(room_type.to_string()),
            neighbourhood: Some(neighbourhood.to_string()),
            location: Some(self.config.location.clone()),
            scraped_at: Utc::now(),
            source: SAMPLE_SOURCE.to_string(),
        }
    }

    /// Every day of the configured window for every listing, with random
    /// availability.
    fn calendar(&mut self, listings: &[ScrapedListing]) -> Vec<CalendarEntry> {
        let window = self.config.window;
        let mut entries = Vec::new();

        for l in listings {
            let price = format_brl(l.price.unwrap_or_default());
            for date in window.start.iter_days().take_while(|d| *d <= window.end) {
                entries.push(CalendarEntry {
                    listing_id: l.listing_id.clone(),
                    date,
                    price: price.clone(),
                    available: if self.rng.gen_bool(0.5) { "t" } else { "f" },
                });
            }
        }
        entries
    }

    pub fn generate(&mut self) -> Harvest {
        let count = self.config.listing_count();
        let listings: Vec<_> = (1..=count).map(|n| self.listing(n)).collect();
        let calendar = self.calendar(&listings);

        info!(
            listings = listings.len(),
            calendar_rows = calendar.len(),
            window = %self.config.window,
            "Generated sample data"
        );

        Harvest {
            listings,
            calendar,
            failed: 0,
        }
    }
}

#[async_trait]
impl ListingSource for SampleGenerator {
    fn name(&self) -> &'static str {
        SAMPLE_SOURCE
    }

    async fn collect(&mut self) -> Result<Harvest> {
        Ok(self.generate())
    }
}
