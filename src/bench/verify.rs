//! Regression check of a variant against a known level histogram.

use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::config::EngineConfig;
use crate::graph::{CsrGraph, Node};
use crate::search::{level_histogram, Level, Variant};

/// Reference dataset, relative to the repository root.
pub const REFERENCE_DATASET: &str = "data/sg-10k-250k.txt";

/// Source node used for every reference run.
pub const REFERENCE_SOURCE: Node = 2;

/// Expected `level_histogram` of [`REFERENCE_DATASET`] from
/// [`REFERENCE_SOURCE`], as produced by the legacy tooling.
///
/// The legacy tooling sized its level array by the neighbor count (500 000)
/// rather than the node count (10 000), so bucket `0` also counts 490 000
/// padding slots. [`expected_histogram`] maps it onto a node-count sized
/// level array.
pub const REFERENCE_HISTOGRAM: [usize; 5] = [490_000, 1, 55, 2416, 7528];

/// Translates [`REFERENCE_HISTOGRAM`] to `graph`: bucket `0` loses the
/// padding slots (`edge_count - order`) the legacy level array carried.
pub fn expected_histogram(graph: &CsrGraph) -> Vec<usize> {
    let mut expected = REFERENCE_HISTOGRAM.to_vec();
    let padding = graph.edge_count().saturating_sub(graph.order());
    expected[0] = expected[0].saturating_sub(padding);
    expected
}

/// Why a verification run failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    /// The traversal did not finish in time. It keeps running in the
    /// background; there is no way to cancel it.
    #[error("{variant} did not finish within {timeout:?}")]
    Timeout {
        /// Variant name.
        variant: &'static str,
        /// Deadline that passed.
        timeout: Duration,
    },
    /// The traversal finished with a different level histogram.
    #[error("{variant} produced histogram {actual:?}, expected {expected:?}")]
    HistogramMismatch {
        /// Variant name.
        variant: &'static str,
        /// What the run produced.
        actual: Vec<usize>,
        /// What it should have produced.
        expected: Vec<usize>,
    },
    /// The verification thread could not be started.
    #[error("failed to spawn verification thread: {0}")]
    Spawn(String),
    /// The traversal thread panicked.
    #[error("{variant} panicked")]
    Panicked {
        /// Variant name.
        variant: &'static str,
    },
}

/// Runs `variant` with `config` on its own thread and compares the level histogram with
/// `expected`.
///
/// # Errors
/// [`VerifyError::Timeout`] if no result arrives within `timeout`,
/// [`VerifyError::Panicked`] if the run panicked, and
/// [`VerifyError::HistogramMismatch`] if the histogram differs.
pub fn verify(
    variant: Variant,
    graph: Arc<CsrGraph>,
    source: Node,
    config: &EngineConfig,
    expected: &[usize],
    timeout: Duration,
) -> Result<(), VerifyError> {
    let name = variant.name();
    let config = config.clone();
    let (tx, rx) = mpsc::channel::<Vec<Level>>();
    thread::Builder::new()
        .name(format!("verify-{name}"))
        .spawn(move || {
            let mut levels = vec![0; graph.order()];
            variant.run_with(&graph, source, &mut levels, &config);
            // The receiver is gone once the deadline passed.
            let _ = tx.send(levels);
        })
        .map_err(|err| VerifyError::Spawn(err.to_string()))?;

    let levels = match rx.recv_timeout(timeout) {
        Ok(levels) => levels,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            warn!(variant = name, ?timeout, "traversal locked up");
            return Err(VerifyError::Timeout { variant: name, timeout });
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            return Err(VerifyError::Panicked { variant: name });
        }
    };

    let actual = level_histogram(&levels);
    if actual != expected {
        return Err(VerifyError::HistogramMismatch {
            variant: name,
            actual,
            expected: expected.to_vec(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workers(n: usize) -> EngineConfig {
        EngineConfig::default().with_workers(n)
    }

    fn diamond() -> Arc<CsrGraph> {
        Arc::new(CsrGraph::from_undirected_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 4)]))
    }

    #[test]
    fn passes_on_the_right_histogram() {
        for &variant in Variant::all() {
            assert_eq!(verify(variant, diamond(), 0, &workers(2), &[0, 1, 3, 1], Duration::from_secs(10)), Ok(()));
        }
    }

    #[test]
    fn reports_a_mismatch() {
        let err = verify(Variant::Baseline, diamond(), 4, &workers(1), &[0, 1, 3, 1], Duration::from_secs(10)).unwrap_err();
        assert_eq!(
            err,
            VerifyError::HistogramMismatch {
                variant: "baseline",
                actual: vec![0, 1, 1, 2, 1],
                expected: vec![0, 1, 3, 1],
            }
        );
    }

    #[test]
    fn reports_a_panicking_run() {
        // Source out of range: the traversal thread panics on the contract check.
        let err = verify(Variant::Worker, diamond(), 9, &workers(1), &[], Duration::from_secs(10)).unwrap_err();
        assert_eq!(err, VerifyError::Panicked { variant: "worker" });
    }

    #[test]
    fn expected_histogram_drops_padding() {
        // 10 000 nodes, 500 000 neighbor entries.
        let offsets: Vec<u64> = (0..=10_000u64).map(|i| i * 50).collect();
        let graph = CsrGraph::from_csr_parts(offsets, vec![0; 500_000]);
        assert_eq!(expected_histogram(&graph), [0, 1, 55, 2416, 7528]);
    }
}
