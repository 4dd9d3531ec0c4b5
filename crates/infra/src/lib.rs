//! Infrastructure layer: observation/catalog sources, model loading and the
//! concurrent demand pipeline that ties them to the pure domain crates.

pub mod ai;
pub mod pipeline;
pub mod source;

pub use ai::{LoadedModels, ModelBundle, ModelStoreError};
pub use pipeline::{DemandPipeline, ItemRef, PipelineConfig, PipelineError};
pub use source::{
    InMemoryInventoryStore, ItemCatalog, JsonDataset, SourceError, StockObservationSource,
};
