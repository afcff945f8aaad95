//! Field-level parsers for calendar cells: prices, availability flags, dates.
//!
//! None of these fail: a value that cannot be understood becomes `None` (or
//! `false` for availability) and the row carries on.

use chrono::NaiveDate;

/// A price cell as it came out of the source, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPrice {
    Missing,
    /// Already numeric, e.g. from a plain numeric price column.
    Number(f64),
    /// Free text such as `"R$ 1.234,56"` or `"$120.00"`.
    Text(String),
}

impl RawPrice {
    /// Wraps a text cell, treating empty or whitespace-only cells as missing.
    pub fn from_text(cell: &str) -> Self {
        if cell.trim().is_empty() {
            RawPrice::Missing
        } else {
            RawPrice::Text(cell.to_string())
        }
    }

    /// Parses a cell as a plain number, e.g. `"123.5"`. Anything that is not a
    /// number is missing.
    pub fn from_numeric_cell(cell: &str) -> Self {
        match cell.trim().parse::<f64>() {
            Ok(v) => RawPrice::Number(v),
            Err(_) => RawPrice::Missing,
        }
    }
}

/// Normalizes a raw price to a non-negative finite number.
///
/// Text is stripped of `R$`/`$`, `.` is treated as the thousands separator and
/// `,` as the decimal separator. Numeric input passes through unchanged.
pub fn parse_price(raw: &RawPrice) -> Option<f64> {
    let value = match raw {
        RawPrice::Missing => return None,
        RawPrice::Number(v) => *v,
        RawPrice::Text(s) => {
            let cleaned = s
                .trim()
                .replace("R$", "")
                .replace('$', "")
                .replace('.', "")
                .replace(',', ".");
            cleaned.trim().parse::<f64>().ok()?
        }
    };

    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Convenience wrapper for a text cell that may be absent.
pub fn parse_price_text(cell: Option<&str>) -> Option<f64> {
    parse_price(&cell.map_or(RawPrice::Missing, RawPrice::from_text))
}

/// `t`, `true` and `1` (any case) mean the night is still available.
pub fn parse_available(cell: Option<&str>) -> bool {
    match cell {
        Some(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "t" | "true" | "1"),
        None => false,
    }
}

/// Parses `YYYY-MM-DD`, or a timestamp whose first ten characters are one.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let s = cell.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    let head = s.get(..10)?;
    match s.as_bytes().get(10) {
        Some(b'T') | Some(b' ') => NaiveDate::parse_from_str(head, "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// Formats a price the way Brazilian calendar exports do: `R$1234,56`.
pub fn format_brl(price: f64) -> String {
    format!("R${:.2}", price).replace('.', ",")
}
