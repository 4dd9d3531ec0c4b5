//! Stock observation and item catalog sources.
//!
//! Persistence is an external collaborator: the pipeline only needs something
//! that yields an item's snapshots and the catalog entries.

use std::sync::Arc;

use thiserror::Error;

use stockpulse_core::ItemId;
use stockpulse_inventory::{Item, StockObservation};

pub mod in_memory;
pub mod json_file;

pub use in_memory::InMemoryInventoryStore;
pub use json_file::JsonDataset;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The backing store could not be read.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The backing store returned records that do not map onto the domain.
    #[error("corrupt source record: {0}")]
    Corrupt(String),
}

/// Yields raw stock snapshots for an item (any order).
pub trait StockObservationSource: Send + Sync + 'static {
    fn observations_for(&self, item_id: ItemId) -> Result<Vec<StockObservation>, SourceError>;
}

/// Yields item identity and attributes.
pub trait ItemCatalog: Send + Sync + 'static {
    fn items(&self) -> Result<Vec<Item>, SourceError>;

    fn get(&self, item_id: ItemId) -> Result<Option<Item>, SourceError>;

    /// First item whose title matches exactly.
    fn find_by_title(&self, title: &str) -> Result<Option<Item>, SourceError> {
        Ok(self.items()?.into_iter().find(|i| i.title == title))
    }
}

impl<S> StockObservationSource for Arc<S>
where
    S: StockObservationSource + ?Sized,
{
    fn observations_for(&self, item_id: ItemId) -> Result<Vec<StockObservation>, SourceError> {
        (**self).observations_for(item_id)
    }
}

impl<C> ItemCatalog for Arc<C>
where
    C: ItemCatalog + ?Sized,
{
    fn items(&self) -> Result<Vec<Item>, SourceError> {
        (**self).items()
    }

    fn get(&self, item_id: ItemId) -> Result<Option<Item>, SourceError> {
        (**self).get(item_id)
    }

    fn find_by_title(&self, title: &str) -> Result<Option<Item>, SourceError> {
        (**self).find_by_title(title)
    }
}
