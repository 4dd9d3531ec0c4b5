//! ABC tier classification.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use stockpulse_core::AbcCategory;

use crate::registry::ModelRegistry;
use crate::result::{AiError, Classification};

/// Feature vector handed to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbcFeatures {
    pub category: String,
    pub annual_usage_rate: f64,
    pub stock_turnover_rate: f64,
}

/// A pre-fitted ABC classifier (opaque capability).
pub trait AbcClassifier: Send + Sync + core::fmt::Debug {
    fn predict(&self, features: &AbcFeatures) -> Result<AbcCategory, AiError>;
}

/// Maps request-supplied item features to an ABC tier.
#[derive(Debug, Clone)]
pub struct ClassificationService {
    registry: Arc<ModelRegistry>,
    classifier: Arc<dyn AbcClassifier>,
}

impl ClassificationService {
    pub fn new(registry: Arc<ModelRegistry>, classifier: Arc<dyn AbcClassifier>) -> Self {
        Self { registry, classifier }
    }

    /// Classify one item.
    ///
    /// Only items with a registered forecasting model are accepted; anything
    /// else fails with `ItemNotFound` before the classifier is consulted.
    pub fn classify(
        &self,
        item_name: &str,
        category: &str,
        annual_usage_rate: f64,
        stock_turnover_rate: f64,
    ) -> Result<Classification, AiError> {
        if !self.registry.contains(item_name) {
            return Err(AiError::ItemNotFound(item_name.to_string()));
        }
        if !annual_usage_rate.is_finite() || !stock_turnover_rate.is_finite() {
            return Err(AiError::InvalidInput(
                "annual_usage_rate and stock_turnover_rate must be finite numbers".to_string(),
            ));
        }

        let features = AbcFeatures {
            category: category.to_string(),
            annual_usage_rate,
            stock_turnover_rate,
        };
        let abc_category = self.classifier.predict(&features)?;

        Ok(Classification {
            item_name: item_name.to_string(),
            abc_category,
        })
    }
}

/// One cluster center with the tier it stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub label: AbcCategory,
    /// `[category_code, annual_usage_rate, stock_turnover_rate]`, already scaled.
    pub center: [f64; 3],
}

/// Nearest-centroid classifier over `[category_code, usage, turnover]`.
///
/// This is the prediction half of a k-means ABC model: category strings are
/// label-encoded, each feature is divided by its fitted scale, and the label of
/// the closest center (squared Euclidean distance; first center wins ties) is
/// returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentroidClassifier {
    category_codes: BTreeMap<String, f64>,
    #[serde(default = "unit_scale")]
    scale: [f64; 3],
    centroids: Vec<Centroid>,
}

fn unit_scale() -> [f64; 3] {
    [1.0; 3]
}

impl CentroidClassifier {
    pub fn new(category_codes: BTreeMap<String, f64>, centroids: Vec<Centroid>) -> Result<Self, AiError> {
        Self {
            category_codes,
            scale: unit_scale(),
            centroids,
        }
        .validated()
    }

    pub fn with_scale(mut self, scale: [f64; 3]) -> Result<Self, AiError> {
        self.scale = scale;
        self.validated()
    }

    /// Check fitted parameters (used after deserialization too).
    pub fn validated(self) -> Result<Self, AiError> {
        if self.centroids.is_empty() {
            return Err(AiError::InvalidInput("classifier has no centroids".to_string()));
        }
        if self.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(AiError::InvalidInput("classifier scale must be finite and positive".to_string()));
        }
        let bad_center = self
            .centroids
            .iter()
            .any(|c| c.center.iter().any(|v| !v.is_finite()));
        if bad_center || self.category_codes.values().any(|v| !v.is_finite()) {
            return Err(AiError::InvalidInput("classifier parameters must be finite".to_string()));
        }
        Ok(self)
    }

    fn encode(&self, features: &AbcFeatures) -> Result<[f64; 3], AiError> {
        let code = self
            .category_codes
            .get(features.category.trim())
            .ok_or_else(|| AiError::InvalidInput(format!("unknown item category: {}", features.category)))?;
        let raw = [*code, features.annual_usage_rate, features.stock_turnover_rate];
        Ok([0, 1, 2].map(|i| raw[i] / self.scale[i]))
    }
}

impl AbcClassifier for CentroidClassifier {
    fn predict(&self, features: &AbcFeatures) -> Result<AbcCategory, AiError> {
        let x = self.encode(features)?;

        let mut best: Option<(f64, AbcCategory)> = None;
        for c in &self.centroids {
            let d: f64 = c.center.iter().zip(x.iter()).map(|(a, b)| (a - b) * (a - b)).sum();
            match best {
                Some((bd, _)) if bd <= d => {}
                _ => best = Some((d, c.label)),
            }
        }

        best.map(|(_, label)| label)
            .ok_or_else(|| AiError::InferenceFailed("classifier has no centroids".to_string()))
    }
}
