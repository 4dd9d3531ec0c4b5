use std::sync::Arc;

use thiserror::Error;

use stockpulse_ai::{ClassificationService, ForecastOrchestrator};
use stockpulse_infra::{
    DemandPipeline, InMemoryInventoryStore, ItemCatalog, JsonDataset, LoadedModels, ModelBundle, ModelStoreError,
    PipelineConfig, SourceError, StockObservationSource,
};

use crate::config::ApiConfig;

/// Default observation source + catalog backing the HTTP API.
pub type InventoryStore = InMemoryInventoryStore;

pub type Pipeline = DemandPipeline<dyn StockObservationSource, dyn ItemCatalog>;

#[derive(Debug, Error)]
pub enum ServiceInitError {
    #[error(transparent)]
    Models(#[from] ModelStoreError),

    #[error("failed to load dataset: {0}")]
    Data(#[from] SourceError),
}

/// Everything a handler needs, shared behind one `Arc`.
pub struct AppServices {
    pub pipeline: Pipeline,
    pub classification: ClassificationService,
    pub top_demands_default: usize,
}

impl AppServices {
    /// Wire services over any store that is both observation source and catalog.
    pub fn new<S>(store: Arc<S>, models: LoadedModels, config: &ApiConfig) -> Self
    where
        S: StockObservationSource + ItemCatalog,
    {
        let orchestrator = ForecastOrchestrator::new(models.registry.clone()).with_horizon(config.forecast_horizon);
        let source: Arc<dyn StockObservationSource> = store.clone();
        let catalog: Arc<dyn ItemCatalog> = store;
        let pipeline = DemandPipeline::new(
            source,
            catalog,
            Arc::new(orchestrator),
            PipelineConfig::default()
                .with_worker_limit(config.worker_limit)
                .with_item_timeout(config.forecast_timeout),
        );
        let classification = ClassificationService::new(models.registry, models.classifier);

        Self {
            pipeline,
            classification,
            top_demands_default: config.top_demands_default,
        }
    }

    /// Load the model bundle and (optionally) the JSON dataset named by `config`.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ServiceInitError> {
        let models = ModelBundle::load(&config.model_bundle_path)?.into_loaded()?;

        let store = match &config.data_path {
            Some(path) => {
                let store = JsonDataset::load(path)?.into_store()?;
                tracing::info!(
                    path = %path.display(),
                    items = store.item_count(),
                    observations = store.observation_count(),
                    "inventory dataset loaded"
                );
                store
            }
            None => {
                tracing::warn!("DATA_PATH not set; starting with an empty inventory store");
                InventoryStore::new()
            }
        };

        Ok(Self::new(Arc::new(store), models, config))
    }
}
