//! Calendar loading: locate the calendar file, map its header and normalize
//! every row into a [`CalendarRecord`].

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use flate2::read::GzDecoder;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::parser::{parse_available, parse_date, parse_price};
use crate::schema::CalendarSchema;

/// Calendar file names, in priority order.
pub const CALENDAR_CANDIDATES: &[&str] = &["calendar.csv", "calendar.csv.gz", "scraped_calendar.csv"];

/// Listing identifier as it appears in the source files.
///
/// Integer identifiers sort numerically and before any non-integer ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingId(String);

impl ListingId {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for ListingId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for ListingId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl Serialize for ListingId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// One normalized (listing, date) observation.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarRecord {
    pub listing_id: ListingId,
    pub date: NaiveDate,
    /// `None` when the source price could not be parsed.
    pub price: Option<f64>,
    pub is_available: bool,
}

/// A loaded calendar and where it came from.
#[derive(Debug)]
pub struct Calendar {
    pub source: PathBuf,
    pub rows: Vec<CalendarRecord>,
    /// Rows dropped because their date could not be parsed.
    pub skipped_rows: usize,
}

/// Returns the first existing file among `candidates` inside `dir`.
pub fn find_first(dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates.iter().map(|name| dir.join(name)).find(|p| p.is_file())
}

/// Opens a CSV file, decompressing it on the fly when it ends in `.gz`.
pub(crate) fn open_csv(path: &Path) -> Result<csv::Reader<Box<dyn Read>>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let inner: Box<dyn Read> = if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(inner))
}

/// Loads the highest-priority calendar file found in `data_dir`.
#[tracing::instrument(skip_all, fields(data_dir = %data_dir.display()))]
pub fn load_calendar(data_dir: &Path) -> Result<Calendar> {
    let path = find_first(data_dir, CALENDAR_CANDIDATES).ok_or_else(|| {
        PipelineError::CalendarNotFound {
            dir: data_dir.to_path_buf(),
        }
    })?;

    let calendar = read_calendar(&path)?;
    info!(
        path = %path.display(),
        rows = calendar.rows.len(),
        skipped = calendar.skipped_rows,
        "Calendar loaded"
    );
    Ok(calendar)
}

/// Reads and normalizes one calendar file.
pub fn read_calendar(path: &Path) -> Result<Calendar> {
    let mut rdr = open_csv(path)?;
    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .clone();
    let schema = CalendarSchema::resolve(&headers, path)?;
    debug!(?schema, "Calendar schema resolved");

    if schema.available.is_none() {
        info!("No 'available' column, treating every night as available");
    }

    let mut rows = Vec::new();
    let mut skipped_rows = 0usize;

    for result in rdr.records() {
        let record = result.with_context(|| format!("reading {}", path.display()))?;
        match normalize_record(&record, &schema) {
            Some(row) => rows.push(row),
            None => skipped_rows += 1,
        }
    }

    if skipped_rows > 0 {
        warn!(skipped_rows, path = %path.display(), "Dropped rows with unparseable dates");
    }

    Ok(Calendar {
        source: path.to_path_buf(),
        rows,
        skipped_rows,
    })
}

fn normalize_record(record: &StringRecord, schema: &CalendarSchema) -> Option<CalendarRecord> {
    let date = parse_date(record.get(schema.date)?)?;
    let listing_id = ListingId::new(record.get(schema.listing_id).unwrap_or_default());
    let price = parse_price(&schema.price.raw(record));
    let is_available = match schema.available {
        Some(i) => parse_available(record.get(i)),
        None => true,
    };

    Some(CalendarRecord {
        listing_id,
        date,
        price,
        is_available,
    })
}
