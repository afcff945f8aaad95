use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::analyzers::types::{
    AggregationResult, CategoryPrice, DailyPrice, ListingPrice, OverallSummary,
};
use crate::calendar::{CalendarRecord, ListingId};
use crate::listings::{Category, ListingCatalog};
use crate::stats::PriceStats;
use crate::window::DateWindow;

/// Aggregates the rows of one window into the overall, daily, per-listing and
/// (when metadata allows) per-category views.
///
/// Rows without a price count towards nights/observations but not towards any
/// price figure.
pub fn aggregate_window(
    window: &DateWindow,
    rows: &[CalendarRecord],
    listings: Option<&ListingCatalog>,
) -> AggregationResult {
    let stats = PriceStats::from_prices(rows.iter().map(|r| r.price));
    let listings_active = rows
        .iter()
        .map(|r| &r.listing_id)
        .collect::<HashSet<_>>()
        .len();

    let overall = OverallSummary {
        period_start: window.start,
        period_end: window.end,
        listings_active,
        nights: stats.observations,
        mean_price: stats.mean,
        median_price: stats.median,
        p25_price: stats.p25,
        p75_price: stats.p75,
    };
    debug!(
        listings_active,
        nights = stats.observations,
        priced_pct = stats.priced_pct(),
        "Overall window stats computed"
    );

    let room_type = listings
        .filter(|c| c.has(Category::RoomType))
        .map(|c| by_category(rows, c, Category::RoomType));
    let neighbourhood = listings
        .filter(|c| c.has(Category::Neighbourhood))
        .map(|c| by_category(rows, c, Category::Neighbourhood));

    AggregationResult {
        overall,
        daily: daily(rows),
        per_listing: per_listing(rows),
        room_type,
        neighbourhood,
        prices: rows.iter().filter_map(|r| r.price).collect(),
    }
}

/// Groups by date, ascending.
pub fn daily(rows: &[CalendarRecord]) -> Vec<DailyPrice> {
    let mut groups: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for r in rows {
        groups.entry(r.date).or_default().push(r.price);
    }

    groups
        .into_iter()
        .map(|(date, prices)| {
            let s = PriceStats::from_prices(prices);
            DailyPrice {
                date,
                avg_price: s.mean,
                median_price: s.median,
                observations: s.observations,
            }
        })
        .collect()
}

/// Groups by listing id, in [`ListingId`] order.
pub fn per_listing(rows: &[CalendarRecord]) -> Vec<ListingPrice> {
    let mut groups: BTreeMap<&ListingId, Vec<Option<f64>>> = BTreeMap::new();
    for r in rows {
        groups.entry(&r.listing_id).or_default().push(r.price);
    }

    groups
        .into_iter()
        .map(|(id, prices)| {
            let s = PriceStats::from_prices(prices);
            ListingPrice {
                listing_id: id.clone(),
                nights: s.observations,
                mean_price: s.mean,
                median_price: s.median,
                p25: s.p25,
                p75: s.p75,
            }
        })
        .collect()
}

/// Left-joins rows to listing metadata and groups by the chosen category.
///
/// Unmatched or unlabelled rows form a `None` group. Output is sorted by
/// distinct listings, descending; ties keep category-key order.
pub fn by_category(
    rows: &[CalendarRecord],
    catalog: &ListingCatalog,
    category: Category,
) -> Vec<CategoryPrice> {
    let mut groups: BTreeMap<Option<&str>, (HashSet<&ListingId>, Vec<Option<f64>>)> =
        BTreeMap::new();

    for r in rows {
        let key = catalog.label(&r.listing_id, category);
        let (ids, prices) = groups.entry(key).or_default();
        ids.insert(&r.listing_id);
        prices.push(r.price);
    }

    let mut out: Vec<CategoryPrice> = groups
        .into_iter()
        .map(|(key, (ids, prices))| {
            let s = PriceStats::from_prices(prices);
            CategoryPrice {
                category: key.map(str::to_string),
                listings: ids.len(),
                nights: s.observations,
                mean_price: s.mean,
                median_price: s.median,
            }
        })
        .collect();

    // sort_by is stable
    out.sort_by(|a, b| b.listings.cmp(&a.listings));
    out
}
