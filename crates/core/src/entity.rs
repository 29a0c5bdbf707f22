//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// An order keeps its number across edits; two orders with the same number in
/// the same partition are the same record even if their other fields differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
