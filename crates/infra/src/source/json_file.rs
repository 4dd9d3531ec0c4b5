//! File-backed dataset: a JSON document with the catalog and stock snapshots.
//!
//! Shape (field names follow the upstream listing/stock collections):
//!
//! ```json
//! {
//!   "items":  [{ "_id": "<uuid>", "title": "Gloves", "category": "Consumables",
//!                "createdBy": "<ref>", "abcCategory": "A" }],
//!   "stocks": [{ "listing": "<uuid>", "acquisitionDate": "2024-01-03T08:00:00Z",
//!                "quantity": 120 }]
//! }
//! ```
//!
//! Item ids (`_id`, `listing`) must be UUIDs. Records keyed by any other id
//! scheme (for example 24-hex document ids) are rejected as corrupt; convert
//! them before loading.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use stockpulse_core::{AbcCategory, ItemId};
use stockpulse_inventory::{Item, StockObservation};

use super::{InMemoryInventoryStore, SourceError};

#[derive(Debug, Deserialize)]
struct ItemRecord {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, rename = "createdBy")]
    created_by: Option<String>,
    #[serde(default, rename = "abcCategory")]
    abc_category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StockRecord {
    listing: String,
    #[serde(rename = "acquisitionDate")]
    acquisition_date: String,
    quantity: f64,
}

/// Parsed dataset, ready to be turned into an in-memory store.
#[derive(Debug, Clone, Default)]
pub struct JsonDataset {
    pub items: Vec<Item>,
    pub observations: Vec<StockObservation>,
}

#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    items: Vec<ItemRecord>,
    #[serde(default)]
    stocks: Vec<StockRecord>,
}

impl JsonDataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Unavailable(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, SourceError> {
        let parsed: RawDataset =
            serde_json::from_str(raw).map_err(|e| SourceError::Corrupt(format!("dataset: {e}")))?;

        let items = parsed
            .items
            .into_iter()
            .map(item_from_record)
            .collect::<Result<Vec<_>, _>>()?;
        let observations = parsed
            .stocks
            .into_iter()
            .map(observation_from_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { items, observations })
    }

    pub fn into_store(self) -> Result<InMemoryInventoryStore, SourceError> {
        let store = InMemoryInventoryStore::new();
        for item in self.items {
            store.upsert_item(item)?;
        }
        store.record_all(self.observations)?;
        Ok(store)
    }
}

fn item_from_record(rec: ItemRecord) -> Result<Item, SourceError> {
    let id: ItemId = rec
        .id
        .parse()
        .map_err(|e| SourceError::Corrupt(format!("item {:?}: _id must be a UUID ({e})", rec.title)))?;
    let mut item = Item::new(id, rec.title).map_err(|e| SourceError::Corrupt(format!("item {id}: {e}")))?;
    item.category = rec.category;
    item.created_by = rec.created_by;
    item.abc_category = parse_abc(rec.abc_category.as_deref())
        .map_err(|e| SourceError::Corrupt(format!("item {id}: {e}")))?;
    Ok(item)
}

/// Absent, empty and `"unknown"` all mean "not classified yet".
fn parse_abc(raw: Option<&str>) -> Result<Option<AbcCategory>, stockpulse_core::DomainError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("unknown") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

fn observation_from_record(rec: StockRecord) -> Result<StockObservation, SourceError> {
    let item_id: ItemId = rec
        .listing
        .parse()
        .map_err(|e| SourceError::Corrupt(format!("stock record listing {:?} must be a UUID ({e})", rec.listing)))?;
    let timestamp = parse_timestamp(&rec.acquisition_date).ok_or_else(|| {
        SourceError::Corrupt(format!(
            "stock record for {item_id}: unrecognized acquisitionDate {:?}",
            rec.acquisition_date
        ))
    })?;
    let obs = StockObservation::new(item_id, timestamp, rec.quantity);
    obs.validate().map_err(|e| SourceError::Corrupt(e.to_string()))?;
    Ok(obs)
}

/// RFC 3339, or a naive date/datetime taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
