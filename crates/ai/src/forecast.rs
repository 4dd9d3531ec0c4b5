//! Per-item demand forecasting with exogenous regressors.
//!
//! Model inputs:
//! - The item's own monthly demand series lives inside the fitted model.
//! - Exogenous regressors per future step: mean restock quantity and the
//!   one-hot ABC tier indicators `A`, `B`, `C` (always all three columns).
//! - Every future row is identical: restock rate and ABC mix are assumed
//!   constant over the horizon.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use stockpulse_core::{AbcCategory, ItemId};
use stockpulse_inventory::{DemandAggregator, MonthlyAggregate};

use crate::registry::ModelRegistry;
use crate::result::{AiError, ForecastResult};

/// Months projected per forecast call.
pub const DEFAULT_HORIZON: usize = 6;

/// Exogenous column names, in the order every model was fitted with.
pub const EXOGENOUS_COLUMNS: [&str; 4] = ["restock_quantity", "ABC_A", "ABC_B", "ABC_C"];

/// One row of exogenous regressors.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExogenousRow {
    pub restock_quantity: f64,
    pub abc_a: f64,
    pub abc_b: f64,
    pub abc_c: f64,
}

impl ExogenousRow {
    /// Regressors summarizing an item's history.
    ///
    /// Each month of `history` is labelled with `abc_category`; indicators are
    /// the per-column means of the one-hot labels (all zero when unknown).
    /// Returns `None` for an empty history.
    pub fn from_history(history: &[MonthlyAggregate], abc_category: Option<AbcCategory>) -> Option<Self> {
        let restock_quantity = DemandAggregator::mean_restock(history)?;
        let labels: Vec<Option<AbcCategory>> = history.iter().map(|_| abc_category).collect();
        let [abc_a, abc_b, abc_c] = indicator_means(&labels);
        Some(Self {
            restock_quantity,
            abc_a,
            abc_b,
            abc_c,
        })
    }

    /// Values in [`EXOGENOUS_COLUMNS`] order.
    pub fn to_array(&self) -> [f64; 4] {
        [self.restock_quantity, self.abc_a, self.abc_b, self.abc_c]
    }

    pub fn indicator_sum(&self) -> f64 {
        self.abc_a + self.abc_b + self.abc_c
    }
}

/// Column means of the one-hot encoding of `labels` (unknown labels encode as all zeros).
fn indicator_means(labels: &[Option<AbcCategory>]) -> [f64; 3] {
    let mut sums = [0.0_f64; 3];
    if labels.is_empty() {
        return sums;
    }
    for label in labels.iter().flatten() {
        sums[label.index()] += 1.0;
    }
    let n = labels.len() as f64;
    sums.map(|s| s / n)
}

/// Exogenous regressor matrix: one row per future step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExogenousMatrix {
    rows: Vec<ExogenousRow>,
}

impl ExogenousMatrix {
    /// `steps` identical rows.
    pub fn constant(row: ExogenousRow, steps: usize) -> Self {
        Self { rows: vec![row; steps] }
    }

    pub fn rows(&self) -> &[ExogenousRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A pre-fitted forecasting model (opaque capability).
///
/// Given the same fitted state and the same exogenous matrix, implementations
/// are expected to return the same forecast.
pub trait ForecastModel: Send + Sync + core::fmt::Debug {
    /// Project `steps` future values using one exogenous row per step.
    fn forecast(&self, steps: usize, exog: &ExogenousMatrix) -> Result<Vec<f64>, AiError>;
}

/// Builds exogenous inputs from aggregated history and runs the item's model.
#[derive(Debug, Clone)]
pub struct ForecastOrchestrator {
    registry: Arc<ModelRegistry>,
    horizon: usize,
}

impl ForecastOrchestrator {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            horizon: DEFAULT_HORIZON,
        }
    }

    /// Override the horizon (must be >= 1; zero falls back to the default).
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = if horizon == 0 { DEFAULT_HORIZON } else { horizon };
        self
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Exogenous matrix the item's model will be called with.
    pub fn exogenous(
        &self,
        history: &[MonthlyAggregate],
        abc_category: Option<AbcCategory>,
    ) -> Result<ExogenousMatrix, AiError> {
        let row = ExogenousRow::from_history(history, abc_category)
            .ok_or_else(|| AiError::InsufficientData("no monthly history to forecast from".to_string()))?;
        Ok(ExogenousMatrix::constant(row, self.horizon))
    }

    /// Forecast `horizon` months of demand for one item.
    ///
    /// Fails with `InsufficientData` on empty history, `ModelNotFound` when the
    /// registry has no model for `item_name`, and `InferenceFailed` when the
    /// model returns a series of the wrong length or with non-finite values.
    pub fn forecast(
        &self,
        item_id: ItemId,
        item_name: &str,
        history: &[MonthlyAggregate],
        abc_category: Option<AbcCategory>,
    ) -> Result<ForecastResult, AiError> {
        if history.is_empty() {
            return Err(AiError::InsufficientData(format!(
                "item {item_name} has no monthly history"
            )));
        }

        let exog = self.exogenous(history, abc_category)?;

        let model = self
            .registry
            .get(item_name)
            .ok_or_else(|| AiError::ModelNotFound(item_name.to_string()))?;

        let forecast = model.forecast(self.horizon, &exog)?;
        if forecast.len() != self.horizon {
            return Err(AiError::InferenceFailed(format!(
                "model for {item_name} returned {} values (expected {})",
                forecast.len(),
                self.horizon
            )));
        }
        if forecast.iter().any(|v| !v.is_finite()) {
            return Err(AiError::InferenceFailed(format!(
                "model for {item_name} returned non-finite values"
            )));
        }

        Ok(ForecastResult {
            item_id,
            item_name: item_name.to_string(),
            previous_demand: DemandAggregator::demand_series(history),
            forecast,
        })
    }
}
