//! Level-synchronous BFS on the rayon pool.
//!
//! Each level is a parallel flat-map over the frontier that keeps the
//! neighbors whose claim succeeded, followed by a parallel sort.

use rayon::prelude::*;

use super::engine::TraversalSummary;
use super::levels::Level;
use crate::graph::access::VisitedSet;
use crate::graph::{CsrGraph, Node};
use crate::GhostToken;

/// Level assignment on the global rayon thread pool.
///
/// # Panics
/// Panics if `levels.len() != graph.order()` or `source` is out of range.
pub fn breadth_first(graph: &CsrGraph, source: Node, levels: &mut [Level]) -> TraversalSummary {
    super::check_contract(graph, source, levels);

    GhostToken::new(|token| {
        let visited = &VisitedSet::new(&token, graph.order());
        visited.try_claim(source);
        levels[source as usize] = 1;

        let mut current = vec![source];
        let mut level: Level = 2;
        while !current.is_empty() {
            let mut next: Vec<Node> = current
                .par_iter()
                .flat_map_iter(move |&node| {
                    graph
                        .neighbors(node)
                        .iter()
                        .copied()
                        .filter(move |&n| visited.try_claim(n))
                })
                .collect();
            next.par_sort_unstable();
            for &node in &next {
                levels[node as usize] = level;
            }
            level += 1;
            current = next;
        }

        TraversalSummary {
            depth: level - 2,
            reached: visited.claimed(),
        }
    })
}
