//! Monthly restock/demand derivation from irregular stock snapshots.
//!
//! Model:
//! - Sort snapshots by timestamp (stable: equal timestamps keep arrival order).
//! - Bucket them by calendar month.
//! - Within a bucket, diff consecutive quantities; positive deltas are restocks,
//!   negative deltas contribute nothing.
//! - `demand = beginning_inventory + ending_inventory - restock_quantity`.

use serde::{Deserialize, Serialize};

use stockpulse_core::{DomainError, DomainResult, ItemId, Month};

use crate::item::StockObservation;

/// Derived per-month inventory figures for one item. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub item_id: ItemId,
    pub month: Month,
    pub restock_quantity: f64,
    pub beginning_inventory: f64,
    pub ending_inventory: f64,
    pub demand: f64,
}

impl MonthlyAggregate {
    /// Build an aggregate from its inventory figures, deriving `demand`.
    pub fn from_inventory(
        item_id: ItemId,
        month: Month,
        restock_quantity: f64,
        beginning_inventory: f64,
        ending_inventory: f64,
    ) -> DomainResult<Self> {
        for (name, v) in [
            ("restock_quantity", restock_quantity),
            ("beginning_inventory", beginning_inventory),
            ("ending_inventory", ending_inventory),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(DomainError::validation(format!(
                    "{name} for {month} must be a finite non-negative number (got {v})"
                )));
            }
        }
        Ok(Self {
            item_id,
            month,
            restock_quantity,
            beginning_inventory,
            ending_inventory,
            demand: monthly_demand(beginning_inventory, ending_inventory, restock_quantity),
        })
    }
}

/// Demand identity used throughout the service.
///
/// NOTE: the textbook inventory identity is `beginning + restock - ending`;
/// this reproduces the established `beginning + ending - restock` figures.
fn monthly_demand(beginning: f64, ending: f64, restock: f64) -> f64 {
    beginning + ending - restock
}

/// Running state for the month currently being scanned.
struct Bucket {
    month: Month,
    first: f64,
    last: f64,
    restock: f64,
}

impl Bucket {
    fn open(month: Month, quantity: f64) -> Self {
        Self {
            month,
            first: quantity,
            last: quantity,
            restock: 0.0,
        }
    }

    fn push(&mut self, quantity: f64) {
        let delta = quantity - self.last;
        if delta > 0.0 {
            self.restock += delta;
        }
        self.last = quantity;
    }

    fn close(self, item_id: ItemId) -> MonthlyAggregate {
        MonthlyAggregate {
            item_id,
            month: self.month,
            restock_quantity: self.restock,
            beginning_inventory: self.first,
            ending_inventory: self.last,
            demand: monthly_demand(self.first, self.last, self.restock),
        }
    }
}

/// Pure aggregator: snapshots in, monthly aggregates out.
#[derive(Debug, Default, Copy, Clone)]
pub struct DemandAggregator;

impl DemandAggregator {
    /// Aggregate one item's snapshots into monthly figures, ascending by month.
    ///
    /// Empty input yields an empty sequence ("insufficient data" is the
    /// caller's call). Snapshots for more than one item, or with negative /
    /// non-finite quantities, are rejected.
    pub fn aggregate(observations: &[StockObservation]) -> DomainResult<Vec<MonthlyAggregate>> {
        let Some(first) = observations.first() else {
            return Ok(Vec::new());
        };
        let item_id = first.item_id;

        for obs in observations {
            if obs.item_id != item_id {
                return Err(DomainError::validation(format!(
                    "aggregation input mixes items {item_id} and {}",
                    obs.item_id
                )));
            }
            obs.validate()?;
        }

        let mut ordered: Vec<&StockObservation> = observations.iter().collect();
        ordered.sort_by_key(|o| o.timestamp);

        let mut out: Vec<MonthlyAggregate> = Vec::new();
        let mut current: Option<Bucket> = None;

        for obs in ordered {
            let month = Month::of(obs.timestamp);
            let same_month = current.as_ref().is_some_and(|b| b.month == month);
            if same_month {
                if let Some(bucket) = current.as_mut() {
                    bucket.push(obs.quantity);
                }
            } else if let Some(done) = current.replace(Bucket::open(month, obs.quantity)) {
                out.push(done.close(item_id));
            }
        }

        if let Some(done) = current {
            out.push(done.close(item_id));
        }

        Ok(out)
    }

    /// The aggregate for the most recent month, if any.
    pub fn latest(aggregates: &[MonthlyAggregate]) -> Option<&MonthlyAggregate> {
        aggregates.iter().max_by_key(|a| a.month)
    }

    /// The `demand` column, in sequence order.
    pub fn demand_series(aggregates: &[MonthlyAggregate]) -> Vec<f64> {
        aggregates.iter().map(|a| a.demand).collect()
    }

    /// Mean `restock_quantity` across the sequence (`None` when empty).
    pub fn mean_restock(aggregates: &[MonthlyAggregate]) -> Option<f64> {
        if aggregates.is_empty() {
            return None;
        }
        let total: f64 = aggregates.iter().map(|a| a.restock_quantity).sum();
        Some(total / aggregates.len() as f64)
    }
}
