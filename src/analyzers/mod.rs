//! Calendar price aggregation.
//!
//! This module filters normalized calendar rows to a date window, computes
//! overall, daily, per-listing and per-category price statistics, and hands
//! the results to the CSV and chart writers.

pub mod aggregate;
pub mod analyzer;
pub mod types;
pub mod utility;
