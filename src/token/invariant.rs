use core::marker::PhantomData;

/// A marker that is invariant in `'id`.
///
/// Invariance stops the compiler from shrinking two different run brands to a
/// common lifetime, which would let state from separate runs unify.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct InvariantLifetime<'id>(PhantomData<fn(&'id ()) -> &'id ()>);

impl<'id> InvariantLifetime<'id> {
    /// Creates a new invariant lifetime marker.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}
