//! Timing statistics.

use std::time::{Duration, Instant};

use serde::Serialize;

/// Summary of a set of timings, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingStats {
    /// Lower median.
    pub median: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (`n - 1` denominator; `0` for one sample).
    pub std_dev: f64,
    /// Fastest run.
    pub min: f64,
    /// Slowest run.
    pub max: f64,
}

impl TimingStats {
    /// Summarizes `timings`. Returns `None` for an empty set.
    pub fn from_durations(timings: &[Duration]) -> Option<Self> {
        if timings.is_empty() {
            return None;
        }
        let mut ms: Vec<f64> = timings.iter().map(|d| d.as_nanos() as f64 / 1e6).collect();
        ms.sort_by(f64::total_cmp);

        let n = ms.len() as f64;
        let mean = ms.iter().sum::<f64>() / n;
        let std_dev = if ms.len() < 2 {
            0.0
        } else {
            (ms.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        };

        Some(Self {
            median: ms[ms.len().div_ceil(2) - 1],
            mean,
            std_dev,
            min: ms[0],
            max: ms[ms.len() - 1],
        })
    }

    /// Tab-separated `med avg std min max` with two decimals.
    pub fn to_tsv(&self) -> String {
        format!(
            "{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}",
            self.median, self.mean, self.std_dev, self.min, self.max
        )
    }
}

/// Times `iterations` calls of `run`, each fed a fresh input from `prepare`
/// (untimed). With `cold`, one extra untimed call goes first so allocator and
/// page-fault warm-up stay out of the numbers.
pub fn measure<S, P, R>(iterations: usize, cold: bool, mut prepare: P, mut run: R) -> Vec<Duration>
where
    P: FnMut() -> S,
    R: FnMut(S),
{
    if cold {
        run(prepare());
    }
    (0..iterations)
        .map(|_| {
            let state = prepare();
            let start = Instant::now();
            run(state);
            start.elapsed()
        })
        .collect()
}
