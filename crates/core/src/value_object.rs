//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. Two
/// snapshots of the same order line taken at the same moment are equal even
/// though they are distinct instances.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Dimensions {
///     weight: Decimal,
///     volume: Decimal,
/// }
///
/// impl ValueObject for Dimensions {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
