//! `stockpulse-ai`
//!
//! **Responsibility:** ranking, ABC classification and demand forecasting on
//! top of derived monthly aggregates.
//!
//! This crate is intentionally storage-agnostic:
//! - Inputs (aggregates, request features) are provided by callers (infra/API).
//! - Fitted models and classifiers are supplied pre-built; only their
//!   predict/forecast interface is consumed here.
//! - It does not log; observability belongs to the boundary layers.

pub mod classification;
pub mod forecast;
pub mod models;
pub mod ranking;
pub mod registry;
pub mod result;

pub use classification::{AbcClassifier, AbcFeatures, Centroid, CentroidClassifier, ClassificationService};
pub use forecast::{
    DEFAULT_HORIZON, EXOGENOUS_COLUMNS, ExogenousMatrix, ExogenousRow, ForecastModel, ForecastOrchestrator,
};
pub use models::{ArxModel, ClassifierSpec, ModelSpec};
pub use ranking::RankingEngine;
pub use registry::{ModelRegistry, ModelRegistryBuilder};
pub use result::{AiError, Classification, ForecastResult};
