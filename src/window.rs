//! Inclusive date window over the calendar.

use chrono::{Datelike, NaiveDate};
use std::fmt;

use crate::calendar::CalendarRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// October 1 through November 30 of `today`'s year.
    pub fn default_for(today: NaiveDate) -> Self {
        let year = today.year();
        // Both dates exist in every year.
        let start = NaiveDate::from_ymd_opt(year, 10, 1).unwrap_or(today);
        let end = NaiveDate::from_ymd_opt(year, 11, 30).unwrap_or(today);
        Self { start, end }
    }

    /// Uses the explicit bounds only when both are given.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>, today: NaiveDate) -> Self {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end),
            _ => Self::default_for(today),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Keeps rows inside the window; with `only_booked`, only unavailable nights.
    pub fn filter(&self, rows: Vec<CalendarRecord>, only_booked: bool) -> Vec<CalendarRecord> {
        rows.into_iter()
            .filter(|r| self.contains(r.date))
            .filter(|r| !only_booked || !r.is_available)
            .collect()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
