use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "bfs-tale workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the traversal benchmarks once per allocator, then write the report
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Only run benchmarks whose id matches this criterion filter
        #[arg(long)]
        filter: Option<String>,
    },
    /// Summarize existing criterion results as a Markdown table
    Report {
        /// Where to write the report
        #[arg(long, default_value = "benchmark_results/report.md")]
        out: PathBuf,
    },
}

const ALLOCATORS: &[&str] = &["alloc-system", "alloc-mimalloc"];

const CRITERION_DIR: &str = "target/criterion";

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, filter } => {
            run_benchmarks(quick, filter.as_deref())?;
            generate_report(Path::new("benchmark_results/report.md"))?;
        }
        Commands::Report { out } => generate_report(&out)?,
    }

    Ok(())
}

/// Criterion baseline name for an allocator feature.
fn baseline_name(alloc: &str) -> &str {
    alloc.trim_start_matches("alloc-")
}

fn run_benchmarks(quick: bool, filter: Option<&str>) -> Result<()> {
    for alloc in ALLOCATORS {
        println!("\n>>> Benchmarking with feature: {alloc}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0");
        cmd.args(["bench", "--bench", "traversal", "--no-default-features", "--features", alloc]);

        // Args for the test runner (Criterion) go after --
        cmd.arg("--");
        if let Some(filter) = filter {
            cmd.arg(filter);
        }
        cmd.arg("--save-baseline").arg(baseline_name(alloc));
        if quick {
            cmd.args(["--measurement-time", "1", "--sample-size", "10", "--noplot"]);
        }

        let status = cmd.status().with_context(|| format!("failed to run bench for {alloc}"))?;
        if status.success() {
            println!("Finished {alloc} in {:.2?}", start.elapsed());
        } else {
            eprintln!("Warning: benchmark failed for {alloc}");
        }
    }
    Ok(())
}

#[derive(Deserialize)]
struct Estimates {
    median: Estimate,
}

#[derive(Deserialize)]
struct Estimate {
    point_estimate: f64,
}

/// Median time in nanoseconds, keyed by benchmark id, then baseline.
type Results = BTreeMap<String, BTreeMap<String, f64>>;

fn generate_report(report_path: &Path) -> Result<()> {
    let criterion_dir = Path::new(CRITERION_DIR);
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let mut results = Results::new();
    collect_results(criterion_dir, criterion_dir, &mut results)?;

    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(report_path)
        .with_context(|| format!("failed to create {}", report_path.display()))?;
    write_table(&mut file, &results)?;

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn write_table(out: &mut impl Write, results: &Results) -> Result<()> {
    writeln!(out, "# Traversal Benchmark Report")?;
    writeln!(out)?;
    writeln!(out, "Median time per iteration; ratios are relative to the system allocator.")?;
    writeln!(out)?;

    write!(out, "| Benchmark |")?;
    for alloc in ALLOCATORS {
        write!(out, " {} | vs system |", baseline_name(alloc))?;
    }
    writeln!(out)?;
    write!(out, "|---|")?;
    for _ in ALLOCATORS {
        write!(out, "---|---|")?;
    }
    writeln!(out)?;

    for (id, by_baseline) in results {
        write!(out, "| {id} |")?;
        let system = by_baseline.get("system").copied();
        for alloc in ALLOCATORS {
            match by_baseline.get(baseline_name(alloc)) {
                Some(&ns) => {
                    let ratio = system.map_or_else(|| "-".to_string(), |s| format!("**{:.2}x**", s / ns));
                    write!(out, " {} | {ratio} |", format_time(ns))?;
                }
                None => write!(out, " N/A | - |")?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn format_time(ns: f64) -> String {
    if ns >= 1e6 {
        format!("{:.2} ms", ns / 1e6)
    } else if ns >= 1e3 {
        format!("{:.2} µs", ns / 1e3)
    } else {
        format!("{ns:.0} ns")
    }
}

/// Walks `target/criterion/<group>/<function>[/<param>]/<baseline>/estimates.json`.
fn collect_results(root: &Path, dir: &Path, results: &mut Results) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            collect_results(root, &path, results)?;
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) != Some("estimates.json") {
            continue;
        }
        let Some(baseline_dir) = path.parent() else { continue };
        let Some(bench_dir) = baseline_dir.parent() else { continue };
        let baseline = baseline_dir.file_name().and_then(|s| s.to_str()).unwrap_or_default();
        // `new`/`base`/`change` are criterion's own scratch baselines.
        if !ALLOCATORS.iter().any(|a| baseline_name(a) == baseline) {
            continue;
        }
        let Ok(id) = bench_dir.strip_prefix(root) else { continue };

        let content = fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
        let estimates: Estimates =
            serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
        results
            .entry(id.to_string_lossy().replace('\\', "/"))
            .or_default()
            .insert(baseline.to_string(), estimates.median.point_estimate);
    }
    Ok(())
}
