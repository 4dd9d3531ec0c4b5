use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use stockpulse_ai::{AbcClassifier, AiError, ClassifierSpec, ModelRegistry, ModelSpec};

#[derive(Debug, Error)]
pub enum ModelStoreError {
    #[error("failed to read model bundle {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model bundle: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model {name}: {error}")]
    Invalid { name: String, error: AiError },
}

/// On-disk bundle: one ABC classifier plus one forecasting model per item title.
///
/// ```json
/// {
///   "classifier": { "kind": "nearest_centroid", "category_codes": {...}, "centroids": [...] },
///   "models": { "Gloves": { "kind": "arx", "intercept": 3.1, "exog": [...], ... } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub classifier: ClassifierSpec,
    #[serde(default)]
    pub models: BTreeMap<String, ModelSpec>,
}

/// Validated, ready-to-share models.
#[derive(Debug, Clone)]
pub struct LoadedModels {
    pub registry: Arc<ModelRegistry>,
    pub classifier: Arc<dyn AbcClassifier>,
}

impl ModelBundle {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelStoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ModelStoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelStoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Validate every spec and build the immutable registry.
    pub fn into_loaded(self) -> Result<LoadedModels, ModelStoreError> {
        let classifier = self
            .classifier
            .into_classifier()
            .map_err(|error| ModelStoreError::Invalid {
                name: "classifier".to_string(),
                error,
            })?;

        let mut builder = ModelRegistry::builder();
        for (name, spec) in self.models {
            let model = spec.into_model().map_err(|error| ModelStoreError::Invalid {
                name: name.clone(),
                error,
            })?;
            builder = builder.register_arc(name, model);
        }
        let registry = builder.build();

        info!(models = registry.len(), "forecast model registry loaded");

        Ok(LoadedModels {
            registry: Arc::new(registry),
            classifier,
        })
    }
}
