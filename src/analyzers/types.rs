//! Data types produced by the aggregation pipeline.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::ListingId;

/// One-row summary of the whole window, written to `prices_summary.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallSummary {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub listings_active: usize,
    pub nights: usize,
    pub mean_price: Option<f64>,
    pub median_price: Option<f64>,
    pub p25_price: Option<f64>,
    pub p75_price: Option<f64>,
}

/// Price figures for a single calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPrice {
    pub date: NaiveDate,
    pub avg_price: Option<f64>,
    pub median_price: Option<f64>,
    pub observations: usize,
}

/// Price figures for a single listing across the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPrice {
    pub listing_id: ListingId,
    pub nights: usize,
    pub mean_price: Option<f64>,
    pub median_price: Option<f64>,
    pub p25: Option<f64>,
    pub p75: Option<f64>,
}

/// Price figures for one room type or neighbourhood.
///
/// `category` is `None` for calendar rows without matching metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPrice {
    pub category: Option<String>,
    pub listings: usize,
    pub nights: usize,
    pub mean_price: Option<f64>,
    pub median_price: Option<f64>,
}

/// Everything the aggregator computes for one window.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    pub overall: OverallSummary,
    pub daily: Vec<DailyPrice>,
    pub per_listing: Vec<ListingPrice>,
    /// `None` when no listing metadata with a `room_type` column was available.
    pub room_type: Option<Vec<CategoryPrice>>,
    /// `None` when no listing metadata with a neighbourhood column was available.
    pub neighbourhood: Option<Vec<CategoryPrice>>,
    /// Every non-null price in the window, in input order; feeds the charts.
    pub prices: Vec<f64>,
}
