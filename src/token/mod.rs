//! Run brands.
//!
//! Every decomposition run opens a fresh `GhostToken<'brand>` scope. The degree
//! tracker, the core array, the compacted scan domain and the coordinator counters
//! all carry that `'brand`, so state allocated for one run cannot be handed to the
//! tasks of another run. The brand is purely compile-time: tokens are zero-sized
//! and no borrow state exists at runtime.
//!
//! ## Core invariant (linearity)
//!
//! `GhostToken<'brand>` is not `Copy`/`Clone`; the only way to obtain one is
//! [`GhostToken::new`], whose closure is universally quantified over `'brand`.

mod invariant;

pub use invariant::InvariantLifetime;

/// A zero-sized token naming one branded scope.
#[derive(Debug)]
pub struct GhostToken<'brand>(InvariantLifetime<'brand>);

impl<'brand> GhostToken<'brand> {
    /// Opens a new branded scope and runs `f` inside it.
    ///
    /// ```rust
    /// use halo_kcore::GhostToken;
    ///
    /// let answer = GhostToken::new(|token| {
    ///     let _ = &token;
    ///     42
    /// });
    /// assert_eq!(answer, 42);
    /// ```
    pub fn new<F, R>(f: F) -> R
    where
        F: for<'new_brand> FnOnce(GhostToken<'new_brand>) -> R,
    {
        f(GhostToken(InvariantLifetime::new()))
    }
}

