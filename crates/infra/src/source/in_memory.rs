use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use stockpulse_core::{Entity, ItemId};
use stockpulse_inventory::{Item, StockObservation};

use super::{ItemCatalog, SourceError, StockObservationSource};

/// In-memory catalog + observation store for tests/dev (and the JSON dataset loader).
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    items: RwLock<BTreeMap<ItemId, Item>>,
    observations: RwLock<HashMap<ItemId, Vec<StockObservation>>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a catalog entry.
    pub fn upsert_item(&self, item: Item) -> Result<(), SourceError> {
        let mut map = self.items.write().map_err(|_| poisoned("items"))?;
        map.insert(*item.id(), item);
        Ok(())
    }

    /// Append a snapshot (arrival order is preserved, not timestamp order).
    pub fn record(&self, observation: StockObservation) -> Result<(), SourceError> {
        let mut map = self.observations.write().map_err(|_| poisoned("observations"))?;
        map.entry(observation.item_id).or_default().push(observation);
        Ok(())
    }

    pub fn record_all(&self, observations: impl IntoIterator<Item = StockObservation>) -> Result<(), SourceError> {
        let mut map = self.observations.write().map_err(|_| poisoned("observations"))?;
        for obs in observations {
            map.entry(obs.item_id).or_default().push(obs);
        }
        Ok(())
    }

    pub fn item_count(&self) -> usize {
        self.items.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn observation_count(&self) -> usize {
        self.observations
            .read()
            .map(|m| m.values().map(Vec::len).sum())
            .unwrap_or(0)
    }
}

fn poisoned(what: &str) -> SourceError {
    SourceError::Unavailable(format!("{what} lock poisoned"))
}

impl StockObservationSource for InMemoryInventoryStore {
    fn observations_for(&self, item_id: ItemId) -> Result<Vec<StockObservation>, SourceError> {
        let map = self.observations.read().map_err(|_| poisoned("observations"))?;
        Ok(map.get(&item_id).cloned().unwrap_or_default())
    }
}

impl ItemCatalog for InMemoryInventoryStore {
    fn items(&self) -> Result<Vec<Item>, SourceError> {
        let map = self.items.read().map_err(|_| poisoned("items"))?;
        Ok(map.values().cloned().collect())
    }

    fn get(&self, item_id: ItemId) -> Result<Option<Item>, SourceError> {
        let map = self.items.read().map_err(|_| poisoned("items"))?;
        Ok(map.get(&item_id).cloned())
    }
}
