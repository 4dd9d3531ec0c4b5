//! Concrete pre-fitted model kinds and their serialized specs.
//!
//! Fitting happens offline; a spec carries the fitted parameters only.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::classification::{AbcClassifier, CentroidClassifier};
use crate::forecast::{EXOGENOUS_COLUMNS, ExogenousMatrix, ForecastModel};
use crate::result::AiError;

/// Autoregressive model with exogenous regressors (ARX).
///
/// `y[t] = intercept + sum_i ar[i] * y[t-1-i] + exog · x[t]`
///
/// `history` is the tail of the fitted demand series (oldest first); forecasts
/// are produced recursively, feeding each prediction back as a lag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArxModel {
    pub intercept: f64,
    #[serde(default)]
    pub ar: Vec<f64>,
    /// One coefficient per exogenous column, in `EXOGENOUS_COLUMNS` order.
    pub exog: [f64; 4],
    #[serde(default)]
    pub history: Vec<f64>,
}

impl ArxModel {
    fn check_lags(&self) -> Result<(), AiError> {
        if self.ar.len() > self.history.len() {
            return Err(AiError::InvalidInput(format!(
                "ARX model has {} lags but only {} fitted history values",
                self.ar.len(),
                self.history.len()
            )));
        }
        Ok(())
    }

    pub fn validated(self) -> Result<Self, AiError> {
        self.check_lags()?;
        let finite = self.intercept.is_finite()
            && self.ar.iter().chain(self.exog.iter()).chain(self.history.iter()).all(|v| v.is_finite());
        if !finite {
            return Err(AiError::InvalidInput("ARX model parameters must be finite".to_string()));
        }
        Ok(self)
    }
}

impl ForecastModel for ArxModel {
    fn forecast(&self, steps: usize, exog: &ExogenousMatrix) -> Result<Vec<f64>, AiError> {
        if exog.len() != steps {
            return Err(AiError::InvalidInput(format!(
                "expected {steps} exogenous rows with columns {EXOGENOUS_COLUMNS:?}, got {}",
                exog.len()
            )));
        }
        self.check_lags()?;

        let mut series: Vec<f64> = self.history.clone();
        let mut out: Vec<f64> = Vec::with_capacity(steps);

        for row in exog.rows() {
            let lags: f64 = self
                .ar
                .iter()
                .enumerate()
                .map(|(i, coef)| coef * series[series.len() - 1 - i])
                .sum();
            let regressors: f64 = self.exog.iter().zip(row.to_array()).map(|(c, x)| c * x).sum();
            let y = self.intercept + lags + regressors;
            series.push(y);
            out.push(y);
        }

        Ok(out)
    }
}

/// Serialized forecasting model, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Arx(ArxModel),
}

impl ModelSpec {
    pub fn into_model(self) -> Result<Arc<dyn ForecastModel>, AiError> {
        match self {
            ModelSpec::Arx(m) => Ok(Arc::new(m.validated()?)),
        }
    }
}

/// Serialized ABC classifier, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    NearestCentroid(CentroidClassifier),
}

impl ClassifierSpec {
    pub fn into_classifier(self) -> Result<Arc<dyn AbcClassifier>, AiError> {
        match self {
            ClassifierSpec::NearestCentroid(c) => Ok(Arc::new(c.validated()?)),
        }
    }
}
