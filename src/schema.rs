//! Resolves input CSV headers to canonical fields, once per file.
//!
//! All header-name heuristics live here so the rest of the pipeline only ever
//! sees typed records.

use csv::StringRecord;
use std::path::Path;

use crate::error::PipelineError;
use crate::parser::RawPrice;

/// How the price column of a calendar file should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceColumn {
    /// Locale-formatted text (`price` or `adjusted_price`).
    Text(usize),
    /// Some other `*price*` column, read as a plain number.
    Numeric(usize),
    /// No price information at all.
    Absent,
}

impl PriceColumn {
    pub fn raw(&self, record: &StringRecord) -> RawPrice {
        match *self {
            PriceColumn::Text(i) => record.get(i).map_or(RawPrice::Missing, RawPrice::from_text),
            PriceColumn::Numeric(i) => record
                .get(i)
                .map_or(RawPrice::Missing, RawPrice::from_numeric_cell),
            PriceColumn::Absent => RawPrice::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSchema {
    pub listing_id: usize,
    pub date: usize,
    pub price: PriceColumn,
    /// `None` when the file has no availability column.
    pub available: Option<usize>,
}

impl CalendarSchema {
    /// Maps a calendar header row. `date` and `listing_id` are required.
    pub fn resolve(headers: &StringRecord, file: &Path) -> Result<Self, PipelineError> {
        let date = position(headers, "date").ok_or_else(|| PipelineError::MissingColumn {
            file: file.to_path_buf(),
            column: "date",
        })?;
        let listing_id =
            position(headers, "listing_id").ok_or_else(|| PipelineError::MissingColumn {
                file: file.to_path_buf(),
                column: "listing_id",
            })?;

        let price = if let Some(i) = position(headers, "price") {
            PriceColumn::Text(i)
        } else if let Some(i) = position(headers, "adjusted_price") {
            PriceColumn::Text(i)
        } else if let Some(i) = headers
            .iter()
            .position(|h| h.trim().to_ascii_lowercase().contains("price"))
        {
            PriceColumn::Numeric(i)
        } else {
            PriceColumn::Absent
        };

        Ok(Self {
            listing_id,
            date,
            price,
            available: position(headers, "available"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSchema {
    pub id: usize,
    pub room_type: Option<usize>,
    pub neighbourhood: Option<usize>,
}

impl ListingSchema {
    /// Maps a listings header row; `None` if there is no `id` column to join on.
    pub fn resolve(headers: &StringRecord) -> Option<Self> {
        let id = position(headers, "id")?;
        let neighbourhood = headers.iter().position(|h| {
            let h = h.to_ascii_lowercase();
            h.contains("neighbourhood") && h.contains("cleansed")
        });

        Some(Self {
            id,
            room_type: position(headers, "room_type"),
            neighbourhood,
        })
    }
}

fn position(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}
