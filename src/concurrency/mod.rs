//! Concurrency building blocks for the traversal engine.
//!
//! Everything here is lock-free: branded atomics, an atomic bitset with a
//! compare-and-swap claim, address wait/wake for the blocking handoff policy,
//! the elect-last-finisher phase handoff itself, and optional CPU pinning.
//! Cache-line padding comes from `crossbeam_utils::CachePadded`.

pub mod atomic;
pub mod pinning;
pub mod sync;

pub use crossbeam_utils::CachePadded;
pub use sync::{HandoffPolicy, PhaseHandoff};
