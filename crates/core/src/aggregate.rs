//! Aggregate root trait for document-style domain models.

/// Aggregate root marker + minimal interface.
///
/// Documents (orders, receipts, ...) own their line items. Any change to a line
/// is a change to the owning aggregate, which is why the aggregate exposes a
/// monotonically increasing version.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Bumped every time the aggregate, or one of the lines it owns, is modified.
    fn version(&self) -> u64;
}
