use core::marker::PhantomData;

/// A marker type that is invariant in its lifetime parameter `'id`.
///
/// Branded traversal state stores this marker, so the compiler cannot shrink
/// two unrelated brands into a common lifetime and unify them.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvariantLifetime<'id>(PhantomData<fn(&'id ()) -> &'id ()>);

impl<'id> InvariantLifetime<'id> {
    /// Creates a new invariant lifetime marker.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}
