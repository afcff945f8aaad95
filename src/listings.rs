//! Optional listing metadata (room type, neighbourhood) joined onto calendar
//! rows by listing identifier.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::calendar::{ListingId, find_first, open_csv};
use crate::schema::ListingSchema;

/// Listings file names, in priority order.
pub const LISTING_CANDIDATES: &[&str] = &[
    "listings.csv",
    "listings.csv.gz",
    "scraped_listings_detail.csv",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingMeta {
    pub room_type: Option<String>,
    pub neighbourhood: Option<String>,
}

/// Which categorical breakdown to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    RoomType,
    Neighbourhood,
}

/// Metadata keyed by listing id, plus which category columns the source had.
#[derive(Debug, Default)]
pub struct ListingCatalog {
    pub source: PathBuf,
    pub has_room_type: bool,
    pub has_neighbourhood: bool,
    entries: HashMap<ListingId, ListingMeta>,
}

impl ListingCatalog {
    pub fn new(has_room_type: bool, has_neighbourhood: bool) -> Self {
        Self {
            has_room_type,
            has_neighbourhood,
            ..Default::default()
        }
    }

    /// Adds a listing; the first entry for an id wins.
    pub fn insert(&mut self, id: ListingId, meta: ListingMeta) {
        self.entries.entry(id).or_insert(meta);
    }

    pub fn get(&self, id: &ListingId) -> Option<&ListingMeta> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has(&self, category: Category) -> bool {
        match category {
            Category::RoomType => self.has_room_type,
            Category::Neighbourhood => self.has_neighbourhood,
        }
    }

    /// Left-join lookup: `None` when the listing is unknown or has no label.
    pub fn label(&self, id: &ListingId, category: Category) -> Option<&str> {
        let meta = self.get(id)?;
        match category {
            Category::RoomType => meta.room_type.as_deref(),
            Category::Neighbourhood => meta.neighbourhood.as_deref(),
        }
    }
}

/// Loads listing metadata from `data_dir` if a listings file is present.
///
/// A file without an `id` column is ignored.
#[tracing::instrument(skip_all, fields(data_dir = %data_dir.display()))]
pub fn load_listings_optional(data_dir: &Path) -> Result<Option<ListingCatalog>> {
    let Some(path) = find_first(data_dir, LISTING_CANDIDATES) else {
        info!("No listings file, skipping room type and neighbourhood breakdowns");
        return Ok(None);
    };

    let catalog = read_listings(&path)?;
    if let Some(ref c) = catalog {
        info!(
            path = %path.display(),
            listings = c.len(),
            room_type = c.has_room_type,
            neighbourhood = c.has_neighbourhood,
            "Listings loaded"
        );
    }
    Ok(catalog)
}

pub fn read_listings(path: &Path) -> Result<Option<ListingCatalog>> {
    let mut rdr = open_csv(path)?;
    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .clone();

    let Some(schema) = ListingSchema::resolve(&headers) else {
        warn!(path = %path.display(), "Listings file has no 'id' column, ignoring it");
        return Ok(None);
    };

    let mut catalog = ListingCatalog::new(schema.room_type.is_some(), schema.neighbourhood.is_some());
    catalog.source = path.to_path_buf();

    for result in rdr.records() {
        let record = result.with_context(|| format!("reading {}", path.display()))?;
        let Some(id) = record.get(schema.id) else {
            continue;
        };

        let label = |col: Option<usize>| {
            col.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        catalog.insert(
            ListingId::new(id),
            ListingMeta {
                room_type: label(schema.room_type),
                neighbourhood: label(schema.neighbourhood),
            },
        );
    }

    Ok(Some(catalog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_listings_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_listings_optional(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_listings_reads_labels() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("listings.csv"),
            "id,name,room_type,neighbourhood_cleansed\n\
             1,Flat,Entire home/apt,Umarizal\n\
             2,Room,Private room,\n\
             1,Duplicate,Shared room,Reduto\n",
        )
        .unwrap();

        let catalog = load_listings_optional(dir.path()).unwrap().unwrap();

        assert!(catalog.has_room_type);
        assert!(catalog.has_neighbourhood);
        assert_eq!(catalog.len(), 2);
        let one = ListingId::from("1");
        assert_eq!(catalog.label(&one, Category::RoomType), Some("Entire home/apt"));
        assert_eq!(catalog.label(&one, Category::Neighbourhood), Some("Umarizal"));
        let two = ListingId::from("2");
        assert_eq!(catalog.label(&two, Category::Neighbourhood), None);
        assert_eq!(catalog.label(&ListingId::from("3"), Category::RoomType), None);
    }

    #[test]
    fn test_scraped_detail_without_neighbourhood() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("scraped_listings_detail.csv"),
            "id,name,room_type,price,rating,scraped_at\nsample_1,Flat,Casa inteira,120.0,4.5,now\n",
        )
        .unwrap();

        let catalog = load_listings_optional(dir.path()).unwrap().unwrap();
        assert!(catalog.has(Category::RoomType));
        assert!(!catalog.has(Category::Neighbourhood));
    }

    #[test]
    fn test_listings_without_id_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("listings.csv"), "listing_id,room_type\n1,Private room\n").unwrap();

        assert!(load_listings_optional(dir.path()).unwrap().is_none());
    }
}
