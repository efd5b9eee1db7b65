//! Sequential BFS where the level array doubles as the visited set.

use super::engine::TraversalSummary;
use super::levels::Level;
use crate::graph::{CsrGraph, Node};

/// Sequential level assignment. Same contract as [`Engine::run`](super::Engine::run).
///
/// # Panics
/// Panics if `levels.len() != graph.order()` or `source` is out of range.
pub fn breadth_first(graph: &CsrGraph, source: Node, levels: &mut [Level]) -> TraversalSummary {
    super::check_contract(graph, source, levels);

    let mut current = Vec::with_capacity(graph.order());
    let mut next = Vec::with_capacity(graph.order());
    levels[source as usize] = 1;
    current.push(source);

    let mut reached = 1;
    let mut level: Level = 2;
    while !current.is_empty() {
        for &node in &current {
            for &neighbor in graph.neighbors(node) {
                let slot = &mut levels[neighbor as usize];
                if *slot == 0 {
                    *slot = level;
                    next.push(neighbor);
                }
            }
        }
        reached += next.len();
        level += 1;
        current.clear();
        core::mem::swap(&mut current, &mut next);
    }

    TraversalSummary {
        depth: level - 2,
        reached,
    }
}
