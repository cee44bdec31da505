//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values
/// (a `Username` or an `Email`), unlike entities which carry an identity.
/// To "modify" one, build a new one; constructors are where validation lives.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
