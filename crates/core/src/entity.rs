//! Entity trait: identity + continuity across attribute changes.

/// Entity marker + minimal interface.
///
/// Catalog items are entities: an item keeps its identity while its title or
/// ABC tier changes.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
