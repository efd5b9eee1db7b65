//! # `bfs_tale` - Parallel Breadth-First Level Assignment
//!
//! Single-source BFS level assignment over large, static CSR graphs, from a
//! plain sequential loop up to a lock-free, phase-synchronized worker engine.
//!
//! ## Guarantees
//!
//! ### Correctness
//! - **Claim before write**: a node enters a frontier only through a winning
//!   compare-and-swap on the visited bitset, and exactly one claim wins per
//!   node. Every level slot therefore has a single writer.
//! - **Deterministic output**: the level array depends only on the graph and
//!   the source, never on the worker count, the handoff policy or scheduling.
//! - **Validated input**: graphs are checked on construction; loaders return a
//!   [`GraphError`] and never a partial graph.
//!
//! ### Concurrency
//! - **Lock-free**: frontier reads and writes are partitioned by `fetch_add`
//!   reservations; phases end at an elect-last-finisher countdown
//!   ([`PhaseHandoff`]), not an OS barrier or lock.
//! - **Branded state**: each traversal opens its own [`GhostToken`] scope, so
//!   visited sets and frontiers of concurrent traversals cannot be mixed up.
//! - **No deadlock on failure**: a panicking worker poisons the handoff,
//!   releases its peers and the panic resurfaces from the traversal call.
//!
//! ## Architecture
//!
//! 1. **Graph View** ([`graph`]): immutable [`CsrGraph`], binary / text loaders.
//! 2. **Visited Set** ([`graph::access`]): atomic bitset claim, optional cuckoo
//!    pre-filter.
//! 3. **Frontier Pair** ([`search::frontier`]): two buffers with read and write
//!    reservation cursors and sentinel padding.
//! 4. **Locality Pass** ([`search::locality`]): per-chunk radix sort and labeling.
//! 5. **Engine** ([`search::Engine`]): a fixed worker pool alternating Expand and
//!    Localize, with a [`HandoffPolicy`] of `Block` or `Spin`.
//!
//! ## Example
//!
//! ```rust
//! use bfs_tale::{CsrGraph, Engine, EngineConfig, HandoffPolicy};
//!
//! let graph = CsrGraph::from_undirected_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 4)]);
//! let mut levels = vec![0; graph.order()];
//!
//! let engine = Engine::new(EngineConfig::default().with_workers(2).with_policy(HandoffPolicy::Spin));
//! let summary = engine.run(&graph, 0, &mut levels);
//!
//! assert_eq!(levels, [1, 2, 3, 2, 2]);
//! assert_eq!(summary.depth, 3);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod bench;
pub mod concurrency;
pub mod config;
pub mod graph;
pub mod search;
pub mod token;

pub use concurrency::{HandoffPolicy, PhaseHandoff};
pub use config::{ConfigError, EngineConfig};
pub use graph::{CsrGraph, GraphError, Node, SENTINEL};
pub use search::{breadth_first, breadth_first_with, level_histogram, Engine, Level, TraversalSummary, Variant};
pub use token::GhostToken;

// Compile-time assertions for memory layout
const _: () = {
    use core::mem;

    // Tokens and brands are ZSTs.
    assert!(mem::size_of::<GhostToken<'static>>() == 0);
    assert!(mem::size_of::<token::InvariantLifetime<'static>>() == 0);

    // The level sink reinterprets `u32` slots as `AtomicU32`.
    assert!(mem::size_of::<Level>() == mem::size_of::<core::sync::atomic::AtomicU32>());
    assert!(mem::align_of::<Level>() == mem::align_of::<core::sync::atomic::AtomicU32>());

    // Branded atomics stay as small as the raw ones.
    assert!(mem::size_of::<concurrency::atomic::GhostAtomicUsize<'static>>() == mem::size_of::<usize>());
};
