//! The parallel traversal engine.
//!
//! A fixed pool of workers is spawned once per traversal and driven through
//! two phases per level:
//!
//! 1. **Expand**: drain `current` by read reservations, claim neighbors in the
//!    visited set, emit winners into `next` through a [`BlockWriter`].
//! 2. **Localize**: radix sort one chunk of `next` per worker and label it.
//!
//! Each phase ends at the same [`PhaseHandoff`]. The finisher of Expand trims
//! `next` to its used length; the finisher of Localize swaps the buffers,
//! advances the level number and raises `done` once the new `current` is
//! empty. No lock or OS barrier is involved.

use core::any::Any;
use core::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tracing::{debug, trace};

use super::frontier::{frontier_capacity, BlockWriter, FrontierPair};
use super::levels::{Level, LevelSink};
use super::locality::{chunk_range, sort_and_label};
use crate::concurrency::atomic::GhostAtomicU32;
use crate::concurrency::pinning::{allowed_cpus, pin_current_thread};
use crate::concurrency::sync::{PhaseHandoff, Poisoned};
use crate::config::EngineConfig;
use crate::graph::access::{CuckooFilter, VisitedSet};
use crate::graph::{CsrGraph, Node, SENTINEL};
use crate::GhostToken;

/// What a finished traversal reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalSummary {
    /// Largest level value assigned (`1` when only the source was reached).
    pub depth: Level,
    /// Number of nodes with a non-zero level.
    pub reached: usize,
}

/// Parallel BFS engine. Cheap to build; holds only its configuration.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Creates an engine.
    ///
    /// # Panics
    /// Panics if `config` does not [validate](EngineConfig::validate).
    pub fn new(config: EngineConfig) -> Self {
        if let Err(err) = config.validate() {
            panic!("{err}");
        }
        Self { config }
    }

    /// Default configuration with `workers` threads.
    pub fn with_workers(workers: usize) -> Self {
        Self::new(EngineConfig::default().with_workers(workers))
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Assigns BFS levels from `source` into `levels`.
    ///
    /// On return `levels[source] == 1`, every reachable node holds its distance
    /// plus one, and unreachable nodes keep `0`.
    ///
    /// # Panics
    /// Panics if `levels.len() != graph.order()`, if `source` is out of range,
    /// or if a worker panics (the panic is re-raised after all workers exit).
    pub fn run(&self, graph: &CsrGraph, source: Node, levels: &mut [Level]) -> TraversalSummary {
        super::check_contract(graph, source, levels);

        let config = &self.config;
        debug!(
            order = graph.order(),
            source,
            workers = config.workers,
            policy = config.policy.name(),
            prefilter = config.prefilter,
            "parallel traversal started"
        );

        let summary = GhostToken::new(|token| {
            let traversal = Traversal::new(&token, graph, source, LevelSink::new(levels), config);
            traversal.launch(config.pin_workers);
            traversal.summary()
        });

        debug!(depth = summary.depth, reached = summary.reached, "parallel traversal finished");
        summary
    }
}

/// Per-traversal shared state, branded so it cannot leak into another run.
struct Traversal<'a, 'brand> {
    graph: &'a CsrGraph,
    levels: LevelSink<'a>,
    visited: VisitedSet<'brand>,
    filter: Option<CuckooFilter<'brand>>,
    frontiers: FrontierPair<'brand>,
    handoff: PhaseHandoff<'brand>,
    level: GhostAtomicU32<'brand>,
    done: AtomicBool,
    workers: usize,
    read_block: usize,
    write_block: usize,
}

impl<'a, 'brand> Traversal<'a, 'brand> {
    fn new(
        token: &GhostToken<'brand>,
        graph: &'a CsrGraph,
        source: Node,
        levels: LevelSink<'a>,
        config: &EngineConfig,
    ) -> Self {
        let order = graph.order();
        let visited = VisitedSet::new(token, order);
        visited.try_claim(source);
        levels.set(source as usize, 1);

        let filter = config.prefilter.then(|| {
            let filter = CuckooFilter::with_capacity(token, order);
            filter.insert(source);
            filter
        });

        let capacity = frontier_capacity(order, config.write_block, config.workers);
        Self {
            graph,
            levels,
            visited,
            filter,
            frontiers: FrontierPair::new(token, capacity, &[source]),
            handoff: PhaseHandoff::new(token, config.workers, config.policy),
            level: GhostAtomicU32::new(2),
            done: AtomicBool::new(false),
            workers: config.workers,
            read_block: config.read_block,
            write_block: config.write_block,
        }
    }

    fn launch(&self, pin: bool) {
        let cpus = if pin { allowed_cpus() } else { Vec::new() };
        thread::scope(|s| {
            let handles: Vec<_> = (0..self.workers)
                .map(|worker| {
                    let cpus = &cpus;
                    thread::Builder::new()
                        .name(format!("bfs-worker-{worker}"))
                        .spawn_scoped(s, move || {
                            if pin {
                                pin_current_thread(worker, cpus);
                            }
                            self.work(worker)
                        })
                })
                .collect();

            // A missing worker would leave its peers parked forever.
            if handles.iter().any(Result::is_err) {
                self.handoff.poison();
            }

            let mut failure: Option<Box<dyn Any + Send>> = None;
            for handle in handles {
                match handle {
                    Ok(handle) => {
                        // `Ok(Err(Poisoned))` only ever follows a peer's failure.
                        if let Err(payload) = handle.join() {
                            failure.get_or_insert(payload);
                        }
                    }
                    Err(err) => {
                        let message: Box<dyn Any + Send> = Box::new(format!("failed to spawn worker: {err}"));
                        failure.get_or_insert(message);
                    }
                }
            }
            if let Some(payload) = failure {
                std::panic::resume_unwind(payload);
            }
        });
    }

    fn work(&self, worker: usize) -> Result<(), Poisoned> {
        let _guard = self.handoff.panic_guard();
        loop {
            self.expand();
            self.handoff.arrive(|| self.close_expand())?;
            self.localize(worker);
            self.handoff.arrive(|| self.close_level())?;
            if self.done.load(Ordering::Relaxed) {
                return Ok(());
            }
        }
    }

    fn expand(&self) {
        let current = self.frontiers.current();
        let mut out = BlockWriter::new(self.frontiers.next(), self.write_block);
        loop {
            let block = current.next_read_block(self.read_block);
            if block.is_empty() {
                break;
            }
            // SAFETY: `current` is not written while Expand runs.
            let nodes = unsafe { current.slice(block) };
            for &node in nodes {
                if node == SENTINEL {
                    continue;
                }
                let neighbors = self.graph.neighbors(node);
                match &self.filter {
                    Some(filter) => self.claim_filtered(filter, neighbors, &mut out),
                    None => self.claim_batched(neighbors, &mut out),
                }
            }
        }
        out.finish();
    }

    /// Claims neighbors four at a time, loading all four bitset words first.
    #[inline(always)]
    fn claim_batched(&self, neighbors: &[Node], out: &mut BlockWriter<'_, 'brand>) {
        let mut quads = neighbors.chunks_exact(4);
        for quad in &mut quads {
            let quad = [quad[0], quad[1], quad[2], quad[3]];
            let words = self.visited.load_words4(quad);
            for (node, word) in quad.into_iter().zip(words) {
                if self.visited.try_claim_from(word, node) {
                    out.push(node);
                }
            }
        }
        for &node in quads.remainder() {
            if self.visited.try_claim(node) {
                out.push(node);
            }
        }
    }

    fn claim_filtered(&self, filter: &CuckooFilter<'brand>, neighbors: &[Node], out: &mut BlockWriter<'_, 'brand>) {
        for &node in neighbors {
            // A "maybe" only buys an exact read before the claim.
            if filter.may_contain(node) && self.visited.is_claimed(node) {
                continue;
            }
            if self.visited.try_claim(node) {
                filter.insert(node);
                out.push(node);
            }
        }
    }

    fn close_expand(&self) {
        let next = self.frontiers.next();
        next.set_len(next.head());
        next.reset_head();
    }

    fn localize(&self, worker: usize) {
        let next = self.frontiers.next();
        let range = chunk_range(next.len(), self.workers, worker);
        if range.is_empty() {
            return;
        }
        let level = self.level.load(Ordering::Relaxed);
        // SAFETY: chunks are disjoint per worker, and `current` is idle during
        // Localize with the same capacity, so its matching range is free scratch.
        let (chunk, scratch) = unsafe {
            (
                next.slice_mut(range.clone()),
                self.frontiers.current().slice_mut(range),
            )
        };
        sort_and_label(chunk, scratch, &self.levels, level);
    }

    fn close_level(&self) {
        let level = self.level.load(Ordering::Relaxed);
        trace!(level, frontier = self.frontiers.next().len(), "level labeled");

        self.frontiers.swap();
        let current = self.frontiers.current();
        current.reset_head();
        let next = self.frontiers.next();
        next.reset_head();
        next.set_len(next.capacity());

        self.level.store(level + 1, Ordering::Relaxed);
        if current.is_empty() {
            self.done.store(true, Ordering::Relaxed);
        }
    }

    fn summary(&self) -> TraversalSummary {
        debug_assert_eq!(self.levels.len(), self.graph.order());
        TraversalSummary {
            // Levels 2.. are assigned in Localize; the last, empty level bumped once more.
            depth: self.level.load(Ordering::Relaxed) - 2,
            reached: self.visited.claimed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::HandoffPolicy;

    fn diamond() -> CsrGraph {
        CsrGraph::from_undirected_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 4)])
    }

    #[test]
    fn labels_the_diamond_with_every_configuration() {
        for workers in [1, 2, 3, 8] {
            for policy in HandoffPolicy::ALL {
                for prefilter in [false, true] {
                    let engine = Engine::new(
                        EngineConfig::default()
                            .with_workers(workers)
                            .with_policy(policy)
                            .with_prefilter(prefilter)
                            .with_read_block(1)
                            .with_write_block(2),
                    );
                    let mut levels = vec![0; 5];
                    let summary = engine.run(&diamond(), 0, &mut levels);
                    assert_eq!(levels, [1, 2, 3, 2, 2], "{workers} workers, {policy:?}");
                    assert_eq!(summary, TraversalSummary { depth: 3, reached: 5 });
                }
            }
        }
    }

    #[test]
    fn pinned_workers_label_the_same_levels() {
        let graph = CsrGraph::from_undirected_edges(64, &(0..63).map(|n| (n, n + 1)).collect::<Vec<_>>());
        let expected: Vec<Level> = (1..=64).collect();
        for policy in HandoffPolicy::ALL {
            for workers in [1, 3, 8] {
                let config = EngineConfig::default()
                    .with_workers(workers)
                    .with_policy(policy)
                    .with_pinning(true);
                let mut levels = vec![0; 64];
                let summary = Engine::new(config).run(&graph, 0, &mut levels);
                assert_eq!(levels, expected, "{workers} workers, {policy:?}");
                assert_eq!(summary, TraversalSummary { depth: 64, reached: 64 });
            }
        }
    }

    fn panic_message(payload: &(dyn Any + Send)) -> &str {
        payload
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| payload.downcast_ref::<&str>().copied())
            .unwrap_or_default()
    }

    #[test]
    fn worker_panic_releases_peers_and_resurfaces() {
        // A path 0 - 1 - ... - 9 labeled into a sink of two slots: Localize of
        // level 3 writes node 2 out of bounds.
        let graph = CsrGraph::from_undirected_edges(10, &(0..9).map(|n| (n, n + 1)).collect::<Vec<_>>());
        for policy in HandoffPolicy::ALL {
            for workers in [1, 3, 8] {
                let config = EngineConfig::default()
                    .with_workers(workers)
                    .with_policy(policy)
                    .with_pinning(true);
                let mut short = vec![0; 2];
                let result = GhostToken::new(|token| {
                    let traversal = Traversal::new(&token, &graph, 0, LevelSink::new(&mut short), &config);
                    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| traversal.launch(config.pin_workers)))
                });
                let payload = result.expect_err("the worker panic must reach the caller");
                assert!(
                    panic_message(payload.as_ref()).contains("out of bounds"),
                    "{workers} workers, {policy:?}: unexpected payload"
                );
                assert_eq!(short, [1, 2]);
            }
        }
    }

    #[test]
    fn isolated_source_is_depth_one() {
        let graph = CsrGraph::from_adjacency(&[vec![], vec![0]]);
        let mut levels = vec![0; 2];
        let summary = Engine::with_workers(4).run(&graph, 0, &mut levels);
        assert_eq!(levels, [1, 0]);
        assert_eq!(summary, TraversalSummary { depth: 1, reached: 1 });
    }

    #[test]
    fn self_loops_and_duplicate_edges_are_harmless() {
        let graph = CsrGraph::from_adjacency(&[vec![0, 1, 1, 1, 2], vec![1, 2, 2], vec![0, 2]]);
        let mut levels = vec![0; 3];
        Engine::with_workers(2).run(&graph, 0, &mut levels);
        assert_eq!(levels, [1, 2, 2]);
    }

    #[test]
    #[should_panic(expected = "invalid level length")]
    fn short_level_array_panics() {
        Engine::with_workers(1).run(&diamond(), 0, &mut [0; 4]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn source_out_of_range_panics() {
        Engine::with_workers(1).run(&diamond(), 5, &mut [0; 5]);
    }

    #[test]
    #[should_panic(expected = "must be greater than zero")]
    fn zero_workers_panics() {
        Engine::with_workers(0);
    }
}
