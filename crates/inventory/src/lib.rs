//! Inventory domain module.
//!
//! This crate contains the inventory vocabulary (items, stock snapshots) and
//! the monthly demand derivation, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod demand;
pub mod item;

pub use demand::{DemandAggregator, MonthlyAggregate};
pub use item::{Item, StockObservation};
