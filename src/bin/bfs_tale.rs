//! `bfs-tale`: verify and benchmark every BFS variant on graph datasets.
//!
//! ```text
//! bfs-tale -n 20 --run worker --workers 4 --workers 16 data/*.dat
//! ```
//!
//! Results go to stdout as a tab-separated table (or JSON lines with
//! `--json`); progress and verification problems go to the log on stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info, warn};

use bfs_tale::bench::{self, measure, TimingStats, REFERENCE_DATASET, REFERENCE_SOURCE};
use bfs_tale::graph::io;
use bfs_tale::{CsrGraph, EngineConfig, HandoffPolicy, Node, Variant};

#[cfg(feature = "alloc-mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "bfs-tale")]
#[command(about = "Benchmark breadth-first level assignment variants", long_about = None)]
struct Cli {
    /// Graph files to benchmark (`.dat` binary or `.txt` text)
    datasets: Vec<PathBuf>,

    /// Timed iterations per variant
    #[arg(short = 'n', long, default_value_t = 10)]
    iterations: usize,

    /// Run every variant once, untimed, before measuring it
    #[arg(long)]
    cold: bool,

    /// Only run approaches whose name contains this text (a plain substring,
    /// not a regular expression), e.g. `worker 4x`
    #[arg(long)]
    run: Option<String>,

    /// Worker counts for parallel variants (repeatable; default: 4 and all CPUs,
    /// or the config file's count)
    #[arg(long)]
    workers: Vec<usize>,

    /// Handoff policies for the worker engine (repeatable; default: both, or the
    /// config file's policy)
    #[arg(long)]
    policy: Vec<HandoffPolicy>,

    /// Engine configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source node
    #[arg(long, default_value_t = REFERENCE_SOURCE)]
    source: Node,

    /// Reference dataset every variant is verified against
    #[arg(long, default_value = REFERENCE_DATASET)]
    reference: PathBuf,

    /// Skip verification against the reference dataset
    #[arg(long)]
    no_verify: bool,

    /// Verification deadline per variant, in milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Print one JSON object per result instead of a table
    #[arg(long)]
    json: bool,
}

/// One configured variant run.
struct Approach {
    name: String,
    variant: Variant,
    config: EngineConfig,
}

#[derive(Serialize)]
struct Row<'a> {
    dataset: &'a str,
    approach: &'a str,
    #[serde(flatten)]
    stats: TimingStats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("failed to load engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let datasets = cli
        .datasets
        .iter()
        .map(|path| {
            info!(path = %path.display(), "loading dataset");
            let graph = io::load(path).with_context(|| format!("failed to load {}", path.display()))?;
            Ok((dataset_name(path), graph))
        })
        .collect::<Result<Vec<(String, CsrGraph)>>>()?;

    let approaches = approaches(&cli, &base);

    if !cli.no_verify {
        verify_reference(&cli, &approaches);
    }

    if !cli.json {
        println!("dataset\tapproach\tmed\tavg\tstd\tmin\tmax");
    }
    for (name, graph) in &datasets {
        info!(dataset = %name, "benchmarking");
        if (cli.source as usize) >= graph.order() {
            warn!(dataset = %name, source = cli.source, order = graph.order(), "source out of range, skipping");
            continue;
        }
        for approach in &approaches {
            let timings = measure(
                cli.iterations,
                cli.cold,
                || vec![0; graph.order()],
                |mut levels| {
                    approach.variant.run_with(graph, cli.source, &mut levels, &approach.config);
                },
            );
            let Some(stats) = TimingStats::from_durations(&timings) else {
                continue;
            };
            info!(approach = %approach.name, median_ms = stats.median, "done");
            if cli.json {
                let row = Row {
                    dataset: name,
                    approach: &approach.name,
                    stats,
                };
                println!("{}", serde_json::to_string(&row)?);
            } else {
                println!("{name}\t{}\t{}", approach.name, stats.to_tsv());
            }
        }
    }
    Ok(())
}

/// Expands variants over worker counts and policies, then applies `--run`.
fn approaches(cli: &Cli, base: &EngineConfig) -> Vec<Approach> {
    // Explicit flags win, then the config file, then the built-in sweep.
    let workers = match (cli.workers.is_empty(), cli.config.is_some()) {
        (false, _) => cli.workers.clone(),
        (true, true) => vec![base.workers],
        (true, false) => {
            let mut counts = vec![4, bfs_tale::config::default_workers()];
            counts.dedup();
            counts
        }
    };
    let configured = [base.policy];
    let policies: &[HandoffPolicy] = match (cli.policy.is_empty(), cli.config.is_some()) {
        (false, _) => &cli.policy,
        (true, true) => &configured,
        (true, false) => &HandoffPolicy::ALL,
    };

    let mut out = Vec::new();
    for &variant in Variant::all() {
        if !variant.is_parallel() {
            out.push(Approach {
                name: variant.name().to_string(),
                variant,
                config: base.clone(),
            });
            continue;
        }
        for &count in &workers {
            let config = base.clone().with_workers(count);
            if variant == Variant::Worker {
                for &policy in policies {
                    out.push(Approach {
                        name: format!("{variant} {count}x {}", policy.name()),
                        variant,
                        config: config.clone().with_policy(policy),
                    });
                }
            } else {
                out.push(Approach {
                    name: format!("{variant} {count}x"),
                    variant,
                    config,
                });
            }
        }
    }

    if let Some(filter) = &cli.run {
        out.retain(|a| a.name.contains(filter.as_str()));
    }
    out.retain(|a| match a.config.validate() {
        Ok(()) => true,
        Err(err) => {
            warn!(approach = %a.name, %err, "skipping");
            false
        }
    });
    out
}

/// Checks each approach's level histogram on the reference dataset. Problems
/// are logged, never fatal.
fn verify_reference(cli: &Cli, approaches: &[Approach]) {
    if !cli.reference.exists() {
        warn!(path = %cli.reference.display(), "reference dataset missing, skipping verification");
        return;
    }
    let graph = match io::load(&cli.reference) {
        Ok(graph) => Arc::new(graph),
        Err(err) => {
            error!(path = %cli.reference.display(), %err, "failed to load reference dataset");
            return;
        }
    };
    let expected = bench::expected_histogram(&graph);
    let timeout = Duration::from_millis(cli.timeout_ms);
    for approach in approaches {
        let result = bench::verify(
            approach.variant,
            Arc::clone(&graph),
            REFERENCE_SOURCE,
            &approach.config,
            &expected,
            timeout,
        );
        if let Err(err) = result {
            error!(approach = %approach.name, %err, "verification failed");
        }
    }
}

/// File name up to its first dot.
fn dataset_name(path: &Path) -> String {
    let name = path.file_name().map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy());
    match name.find('.') {
        Some(dot) => name[..dot].to_string(),
        None => name.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(args: &[&str]) -> Vec<String> {
        let cli = Cli::try_parse_from(std::iter::once("bfs-tale").chain(args.iter().copied())).unwrap();
        approaches(&cli, &EngineConfig::default())
            .into_iter()
            .map(|a| a.name)
            .collect()
    }

    #[test]
    fn run_filter_matches_a_plain_substring() {
        let sweep = ["--workers", "4", "--policy", "spin"];
        assert_eq!(selected(&sweep).len(), Variant::all().len());
        assert_eq!(selected(&[&sweep[..], &["--run", "worker 4x"]].concat()), ["worker 4x spin"]);
        // Pattern syntax is matched literally.
        assert!(selected(&[&sweep[..], &["--run", "^worker"]].concat()).is_empty());
        assert!(selected(&[&sweep[..], &["--run", "work.*"]].concat()).is_empty());
    }
}
