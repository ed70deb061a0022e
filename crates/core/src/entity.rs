//! Entity trait: a record that keeps its identity while its state changes.

/// Anything a repository stores and looks up by key.
pub trait Entity {
    /// Identifier type; stable for the entity's whole lifetime.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
