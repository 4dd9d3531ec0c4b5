use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockpulse_core::{AbcCategory, ItemId};

/// Outcome of a per-item demand forecast.
///
/// `forecast.len()` always equals the orchestrator's horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub item_id: ItemId,
    pub item_name: String,
    /// Observed monthly demand, ascending by month.
    pub previous_demand: Vec<f64>,
    /// Projected demand for the next `horizon` months.
    pub forecast: Vec<f64>,
}

/// Outcome of an ABC classification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub item_name: String,
    pub abc_category: AbcCategory,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AiError {
    /// The item is not part of the closed set of items the service has models for.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("no forecasting model registered for item: {0}")]
    ModelNotFound(String),

    /// Nothing to compute from (e.g. no monthly history).
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("inference failed: {0}")]
    InferenceFailed(String),
}
