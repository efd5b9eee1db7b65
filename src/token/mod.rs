//! `GhostToken` - per-traversal branding.
//!
//! Every traversal opens a fresh brand with [`GhostToken::new`]. Visited sets,
//! frontier cursors and cuckoo filters created inside that scope carry the
//! brand in their type, so state belonging to one traversal can never be handed
//! to the workers of another, even when several traversals share one graph.
//!
//! ## Core invariant (linearity)
//!
//! `GhostToken<'brand>` is intentionally **not** `Copy`/`Clone`, and the brand
//! lifetime is invariant: two calls to [`GhostToken::new`] always produce
//! incompatible brands.

/// Invariant lifetime definitions for branding.
pub mod invariant;

pub use invariant::InvariantLifetime;

/// A zero-sized token naming one branding scope.
#[derive(Debug)]
pub struct GhostToken<'brand> {
    _brand: InvariantLifetime<'brand>,
}

impl<'brand> GhostToken<'brand> {
    /// Creates a new token and executes a closure with it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bfs_tale::GhostToken;
    /// use bfs_tale::concurrency::atomic::GhostAtomicBitset;
    ///
    /// let first = GhostToken::new(|token| {
    ///     let bits = GhostAtomicBitset::new(&token, 10);
    ///     bits.try_claim(3)
    /// });
    /// assert!(first);
    /// ```
    pub fn new<F, R>(f: F) -> R
    where
        F: for<'new_brand> FnOnce(GhostToken<'new_brand>) -> R,
    {
        f(GhostToken {
            _brand: InvariantLifetime::new(),
        })
    }
}

// `GhostToken` carries no data; sharing `&GhostToken<'brand>` with scoped workers
// only lets them construct or name branded values, never alias mutable state.
unsafe impl<'brand> Sync for GhostToken<'brand> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_zero_sized() {
        assert_eq!(core::mem::size_of::<GhostToken<'static>>(), 0);
    }

    #[test]
    fn nested_scopes_return_values() {
        let v = GhostToken::new(|_outer| GhostToken::new(|_inner| 7));
        assert_eq!(v, 7);
    }
}
