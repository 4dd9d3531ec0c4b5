//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values:
/// two `Month { year: 2024, month: 3 }` are the same month, and two
/// `AbcCategory::A` are the same tier. Contrast with [`crate::Entity`],
/// where identity survives attribute changes.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
