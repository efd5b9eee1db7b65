//! Branded, lock-free atomic primitives.
//!
//! These types provide **concurrent writer** access using hardware atomics while
//! keeping the *ghost/brand* aspect purely compile-time (zero runtime state).
//!
//! Important:
//! - This does **not** make concurrent mutation "free". Atomic RMW operations have
//!   inherent hardware cost.
//! - The goal is that the *wrapper* overhead is optimized away.

/// Branded `AtomicU32`.
pub mod u32;
/// Branded `AtomicUsize`.
pub mod usize;
/// Branded atomic bitsets.
pub mod bitset;

pub use bitset::GhostAtomicBitset;
pub use u32::GhostAtomicU32;
pub use usize::GhostAtomicUsize;
