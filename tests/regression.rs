//! Level histograms on the reference dataset.
//!
//! Run with `cargo test --test regression -- --ignored` once the dataset is
//! checked out under `data/`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bfs_tale::bench::{expected_histogram, verify, REFERENCE_DATASET, REFERENCE_SOURCE};
use bfs_tale::graph::io;
use bfs_tale::{EngineConfig, HandoffPolicy, Variant};

#[test]
#[ignore = "needs data/sg-10k-250k.txt"]
fn every_variant_reproduces_the_reference_histogram() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(REFERENCE_DATASET);
    let graph = Arc::new(io::load(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display())));
    let expected = expected_histogram(&graph);

    for &variant in Variant::all() {
        for policy in HandoffPolicy::ALL {
            let config = EngineConfig::default().with_workers(4).with_policy(policy);
            let result = verify(
                variant,
                Arc::clone(&graph),
                REFERENCE_SOURCE,
                &config,
                &expected,
                Duration::from_secs(30),
            );
            assert_eq!(result, Ok(()), "{variant} with {policy:?}");
        }
    }
}
