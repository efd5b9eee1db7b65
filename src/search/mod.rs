//! Breadth-first level assignment.
//!
//! Every entry point shares one contract: `levels` has exactly
//! `graph.order()` zeroed slots; on return the source holds `1`, each reachable
//! node holds its distance plus one, and unreachable nodes keep `0`.
//!
//! The variants trade simplicity for speed:
//!
//! | Variant | Threads | Visited | Frontier order |
//! |---|---|---|---|
//! | [`Variant::Baseline`] | 1 | level array | discovery |
//! | [`Variant::RadixSort`] | 1 | bitset | radix sorted |
//! | [`Variant::Frontier`] | spawned per level | atomic bitset | radix sorted |
//! | [`Variant::Worker`] | fixed pool, phase handoff | atomic bitset | sorted per chunk |
//! | `Variant::Rayon` (feature `parallel`) | rayon pool | atomic bitset | sorted |
//!
//! [`Variant::Worker`] is the [`Engine`]; it is what [`breadth_first`] runs.

pub mod baseline;
pub mod engine;
pub mod frontier;
pub mod frontier_scoped;
pub mod levels;
pub mod locality;
pub mod radix;
#[cfg(feature = "parallel")]
pub mod rayon_levels;
pub mod sort;

use core::fmt;
use core::str::FromStr;

pub use engine::{Engine, TraversalSummary};
pub use levels::{level_histogram, Level};

use crate::config::EngineConfig;
use crate::graph::{CsrGraph, Node};

/// Runs the parallel engine with the default configuration.
///
/// # Panics
/// Panics if `levels.len() != graph.order()` or `source` is out of range.
pub fn breadth_first(graph: &CsrGraph, source: Node, levels: &mut [Level]) -> TraversalSummary {
    Engine::default().run(graph, source, levels)
}

/// Runs the parallel engine with `workers` threads.
///
/// # Panics
/// Panics on the same contract violations as [`breadth_first`], or if
/// `workers == 0`.
pub fn breadth_first_with(graph: &CsrGraph, source: Node, levels: &mut [Level], workers: usize) -> TraversalSummary {
    Engine::with_workers(workers).run(graph, source, levels)
}

pub(crate) fn check_contract(graph: &CsrGraph, source: Node, levels: &[Level]) {
    let order = graph.order();
    assert!(
        levels.len() == order,
        "invalid level length: {} for a graph of order {order}",
        levels.len()
    );
    assert!((source as usize) < order, "source {source} out of bounds for order {order}");
    debug_assert!(levels.iter().all(|&l| l == 0), "level array must be zeroed");
}

/// A BFS implementation, selectable at run time for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Sequential; the level array is the visited set.
    Baseline,
    /// Sequential; bitset visited set and radix-sorted frontiers.
    RadixSort,
    /// Parallel Expand with threads spawned per level.
    Frontier,
    /// The fixed worker pool driven by phase handoffs.
    Worker,
    /// Level-synchronous rayon traversal.
    #[cfg(feature = "parallel")]
    Rayon,
}

impl Variant {
    /// Every compiled-in variant, simplest first.
    pub fn all() -> &'static [Variant] {
        &[
            Variant::Baseline,
            Variant::RadixSort,
            Variant::Frontier,
            Variant::Worker,
            #[cfg(feature = "parallel")]
            Variant::Rayon,
        ]
    }

    /// Stable short name used on the command line and in reports.
    pub fn name(self) -> &'static str {
        match self {
            Variant::Baseline => "baseline",
            Variant::RadixSort => "radix_sort",
            Variant::Frontier => "frontier",
            Variant::Worker => "worker",
            #[cfg(feature = "parallel")]
            Variant::Rayon => "rayon",
        }
    }

    /// Returns `true` if the variant uses more than the calling thread.
    pub fn is_parallel(self) -> bool {
        !matches!(self, Variant::Baseline | Variant::RadixSort)
    }

    /// Runs this variant with the default engine configuration and `workers` threads.
    pub fn run(self, graph: &CsrGraph, source: Node, levels: &mut [Level], workers: usize) -> TraversalSummary {
        self.run_with(graph, source, levels, &EngineConfig::default().with_workers(workers))
    }

    /// Runs this variant. Only [`Variant::Worker`] honours every field of
    /// `config`; [`Variant::Frontier`] takes just the worker count, and the
    /// others ignore it.
    ///
    /// # Panics
    /// Panics if `levels.len() != graph.order()`, `source` is out of range or
    /// `config` is invalid for a parallel variant.
    pub fn run_with(
        self,
        graph: &CsrGraph,
        source: Node,
        levels: &mut [Level],
        config: &EngineConfig,
    ) -> TraversalSummary {
        match self {
            Variant::Baseline => baseline::breadth_first(graph, source, levels),
            Variant::RadixSort => radix::breadth_first(graph, source, levels),
            Variant::Frontier => frontier_scoped::breadth_first(graph, source, levels, config.workers),
            Variant::Worker => Engine::new(config.clone()).run(graph, source, levels),
            #[cfg(feature = "parallel")]
            Variant::Rayon => rayon_levels::breadth_first(graph, source, levels),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::all()
            .iter()
            .copied()
            .find(|v| v.name() == s)
            .ok_or_else(|| format!("unknown variant `{s}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_labels_the_diamond() {
        let graph = CsrGraph::from_undirected_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 4)]);
        for &variant in Variant::all() {
            let mut levels = vec![0; 5];
            let summary = variant.run(&graph, 0, &mut levels, 3);
            assert_eq!(levels, [1, 2, 3, 2, 2], "{variant}");
            assert_eq!(summary, TraversalSummary { depth: 3, reached: 5 }, "{variant}");
        }
    }

    #[test]
    fn names_round_trip() {
        for &variant in Variant::all() {
            assert_eq!(variant.name().parse::<Variant>(), Ok(variant));
        }
        assert!("dfs".parse::<Variant>().is_err());
        assert!(!Variant::Baseline.is_parallel());
        assert!(Variant::Worker.is_parallel());
    }

    #[test]
    #[should_panic(expected = "invalid level length")]
    fn baseline_checks_the_level_length() {
        let graph = CsrGraph::from_adjacency(&[vec![1], vec![0]]);
        baseline::breadth_first(&graph, 0, &mut [0; 3]);
    }
}
