//! Entity traits: identity, plus soft deletion for records that are never
//! physically removed.

use crate::timestamps::Timestamps;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Entity that is flagged with a deletion time instead of being removed.
pub trait SoftDeletes: Entity {
    /// `None` while the entity has never been persisted.
    fn timestamps(&self) -> Option<&Timestamps>;

    fn is_trashed(&self) -> bool {
        self.timestamps().is_some_and(|ts| ts.is_deleted())
    }
}
