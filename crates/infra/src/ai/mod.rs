//! AI model adapters: loading the pre-fitted model bundle.
//!
//! The bundle is read once at startup; the resulting registry and classifier
//! are immutable for the lifetime of the process.

pub mod model_store;

pub use model_store::{LoadedModels, ModelBundle, ModelStoreError};
