//! `stockpulse-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model and the small value objects every other
//! crate speaks in (calendar months, ABC tiers).

pub mod abc;
pub mod entity;
pub mod error;
pub mod id;
pub mod month;
pub mod value_object;

pub use abc::AbcCategory;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::ItemId;
pub use month::Month;
pub use value_object::ValueObject;
