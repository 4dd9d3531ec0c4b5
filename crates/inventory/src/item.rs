use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpulse_core::{AbcCategory, DomainError, DomainResult, Entity, ItemId};

/// Catalog entry for an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    /// `None` until the item has been classified.
    #[serde(default)]
    pub abc_category: Option<AbcCategory>,
}

impl Item {
    pub fn new(id: ItemId, title: impl Into<String>) -> DomainResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("item title cannot be empty"));
        }
        Ok(Self {
            id,
            title,
            category: None,
            created_by: None,
            abc_category: None,
        })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    pub fn with_abc_category(mut self, abc: AbcCategory) -> Self {
        self.abc_category = Some(abc);
        self
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Point-in-time snapshot of the on-hand quantity of one item.
///
/// This is *not* a transaction log entry: consecutive snapshots are diffed to
/// recover restocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockObservation {
    pub item_id: ItemId,
    pub timestamp: DateTime<Utc>,
    pub quantity: f64,
}

impl StockObservation {
    pub fn new(item_id: ItemId, timestamp: DateTime<Utc>, quantity: f64) -> Self {
        Self {
            item_id,
            timestamp,
            quantity,
        }
    }

    /// Quantities are on-hand counts: finite and non-negative.
    pub fn validate(&self) -> DomainResult<()> {
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(DomainError::validation(format!(
                "stock quantity for item {} at {} must be a finite non-negative number (got {})",
                self.item_id, self.timestamp, self.quantity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn item_rejects_blank_title() {
        let err = Item::new(ItemId::new(), "   ").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn item_builder_sets_optional_attributes() {
        let item = Item::new(ItemId::new(), "Gloves")
            .unwrap()
            .with_category("Consumables")
            .with_abc_category(AbcCategory::A);
        assert_eq!(item.category.as_deref(), Some("Consumables"));
        assert_eq!(item.abc_category, Some(AbcCategory::A));
        assert_eq!(item.created_by, None);
    }

    #[test]
    fn item_deserializes_without_abc_category() {
        let id = ItemId::new();
        let json = serde_json::json!({ "id": id, "title": "Syringe" });
        let item: Item = serde_json::from_value(json).unwrap();
        assert_eq!(item.abc_category, None);
    }

    #[test]
    fn observation_rejects_negative_and_nan_quantities() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(StockObservation::new(ItemId::new(), ts, -1.0).validate().is_err());
        assert!(StockObservation::new(ItemId::new(), ts, f64::NAN).validate().is_err());
        assert!(StockObservation::new(ItemId::new(), ts, 0.0).validate().is_ok());
    }
}
