pub mod analyzers;
pub mod calendar;
pub mod chart;
pub mod config;
pub mod error;
pub mod fetch;
pub mod listings;
pub mod output;
pub mod parser;
pub mod schema;
pub mod scrape;
pub mod stats;
pub mod window;
