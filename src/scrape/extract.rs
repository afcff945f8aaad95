//! Listing-card extraction from a search results page.

use anyhow::{Result, anyhow};
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};

use crate::parser::{RawPrice, parse_price};
use crate::scrape::{Extraction, ScrapedListing};

pub const SCRAPER_SOURCE: &str = "airbnb_scraper";

/// CSS selectors for the pieces of a listing card, parsed once.
pub struct Selectors {
    title: Selector,
    price: Selector,
    subtitle: Selector,
    room_link: Selector,
    next_page: Selector,
}

impl Selectors {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: selector(r#"[data-testid="listing-card-title"]"#)?,
            price: selector(r#"[data-testid="price-availability"]"#)?,
            subtitle: selector(r#"[data-testid="listing-card-subtitle"]"#)?,
            room_link: selector(r#"a[href*="/rooms/"]"#)?,
            next_page: selector(r#"[aria-label*="Next"]"#)?,
        })
    }
}

fn selector(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css}: {e}"))
}

/// Cards of one page plus whether a usable "Next" control exists.
#[derive(Debug, Clone, PartialEq)]
pub struct PageExtraction {
    pub items: Vec<Extraction>,
    pub has_next: bool,
}

/// Extracts every listing card of `html`.
///
/// `first_index` numbers the cards across pages, used for fallback ids and
/// failure reports.
pub fn extract_page(html: &str, sel: &Selectors, first_index: usize) -> PageExtraction {
    let doc = Html::parse_document(html);
    let scraped_at = Utc::now();

    let items = doc
        .select(&sel.title)
        .enumerate()
        .map(|(i, card)| extract_card(card, sel, first_index + i, scraped_at))
        .collect();

    PageExtraction {
        items,
        has_next: has_next_page(&doc, sel),
    }
}

fn extract_card(
    card: ElementRef<'_>,
    sel: &Selectors,
    index: usize,
    scraped_at: chrono::DateTime<Utc>,
) -> Extraction {
    let title = element_text(card);
    if title.is_empty() {
        return Extraction::Failed {
            index,
            reason: "listing card has no title".to_string(),
        };
    }

    let container = card_container(card);

    let price = container
        .select(&sel.price)
        .next()
        .and_then(|e| brl_amount(&element_text(e)));

    let subtitle = container.select(&sel.subtitle).next().map(element_text);
    let rating = subtitle.as_deref().and_then(first_decimal);
    let room_type = subtitle
        .as_deref()
        .and_then(|s| s.split('·').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let listing_id = container
        .select(&sel.room_link)
        .filter_map(|a| a.value().attr("href"))
        .find_map(room_id)
        .unwrap_or_else(|| format!("scraped_{}_{}", scraped_at.timestamp(), index));

    Extraction::Listing(ScrapedListing {
        listing_id,
        title,
        price,
        rating,
        room_type,
        neighbourhood: None,
        location: None,
        scraped_at,
        source: SCRAPER_SOURCE.to_string(),
    })
}

/// Closest enclosing `div` whose class mentions "listing", else the parent.
fn card_container(card: ElementRef<'_>) -> ElementRef<'_> {
    card.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| {
            e.value().name() == "div"
                && e.value().attr("class").is_some_and(|c| c.contains("listing"))
        })
        .or_else(|| card.parent().and_then(ElementRef::wrap))
        .unwrap_or(card)
}

fn has_next_page(doc: &Html, sel: &Selectors) -> bool {
    doc.select(&sel.next_page).next().is_some_and(|e| {
        let v = e.value();
        v.attr("disabled").is_none() && v.attr("aria-disabled") != Some("true")
    })
}

fn element_text(e: ElementRef<'_>) -> String {
    e.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `R$` amount in `text`, e.g. `"R$ 1.250 noite"` → 1250.0.
pub fn brl_amount(text: &str) -> Option<f64> {
    let after = &text[text.find("R$")? + 2..];
    let digits: String = after
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let digits = digits.trim_end_matches(['.', ',']);
    if !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    parse_price(&RawPrice::Text(digits.to_string()))
}

/// First number of the form `d+[.,]d+`, e.g. a rating `"4,87 (120)"` → 4.87.
pub fn first_decimal(text: &str) -> Option<f64> {
    let b = text.as_bytes();
    let mut i = 0;
    while i < b.len() {
        if !b[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i + 1 < b.len() && (b[i] == b'.' || b[i] == b',') && b[i + 1].is_ascii_digit() {
            let int_end = i;
            i += 1;
            while i < b.len() && b[i].is_ascii_digit() {
                i += 1;
            }
            let number = format!("{}.{}", &text[start..int_end], &text[int_end + 1..i]);
            return number.parse().ok();
        }
    }
    None
}

/// Digits following `/rooms/` in a listing URL.
pub fn room_id(href: &str) -> Option<String> {
    let after = &href[href.find("/rooms/")? + "/rooms/".len()..];
    let id: String = after.chars().take_while(char::is_ascii_digit).collect();
    (!id.is_empty()).then_some(id)
}
