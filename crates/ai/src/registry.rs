use std::collections::BTreeMap;
use std::sync::Arc;

use crate::forecast::ForecastModel;

/// Closed registry of pre-fitted per-item forecasting models, keyed by item title.
///
/// Built once at startup and read-only afterwards: there is no way to add a
/// model to a built registry. Share it via `Arc` between the forecasting and
/// classification services.
#[derive(Debug, Default, Clone)]
pub struct ModelRegistry {
    models: BTreeMap<String, Arc<dyn ForecastModel>>,
}

impl ModelRegistry {
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    pub fn contains(&self, item_name: &str) -> bool {
        self.models.contains_key(item_name)
    }

    pub fn get(&self, item_name: &str) -> Option<&Arc<dyn ForecastModel>> {
        self.models.get(item_name)
    }

    /// Registered item titles, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ModelRegistryBuilder {
    models: BTreeMap<String, Arc<dyn ForecastModel>>,
}

impl ModelRegistryBuilder {
    /// Register a model; a later registration for the same title replaces the earlier one.
    pub fn register(self, item_name: impl Into<String>, model: impl ForecastModel + 'static) -> Self {
        self.register_arc(item_name, Arc::new(model))
    }

    pub fn register_arc(mut self, item_name: impl Into<String>, model: Arc<dyn ForecastModel>) -> Self {
        self.models.insert(item_name.into(), model);
        self
    }

    pub fn build(self) -> ModelRegistry {
        ModelRegistry { models: self.models }
    }
}
