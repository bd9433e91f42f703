//! Splitting a file into byte ranges and scanning them in parallel.
//!
//! Each range gets its own thread, file handle and sketch. Workers share only the
//! [`ProgressCounter`]. The coordinator joins every worker before looking at any
//! result, so one failing range fails the whole run and no partial estimate is
//! returned.

use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, info_span, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::hyperloglog::HyperLogLog;
use crate::progress::{report_progress, ProgressCounter};
use crate::scanner::{scan_file, ChunkResult};

/// Largest estimate that can describe a set of IPv4 addresses.
pub const MAX_ESTIMATE: u64 = 1 << 32;

/// Half-open byte range `[start, end)` of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl Display for ByteRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Split `file_size` bytes into `workers` contiguous ranges of `file_size / workers`
/// bytes, the last one extended to the end of file.
///
/// `workers` is clamped to at least 1. When the file is smaller than `workers` a
/// single range covers the whole file.
pub fn split(file_size: u64, workers: usize) -> Vec<ByteRange> {
    let workers = workers.max(1) as u64;
    let chunk_size = file_size / workers;
    if chunk_size == 0 {
        return vec![ByteRange::new(0, file_size)];
    }

    (0..workers)
        .map(|i| {
            let start = i * chunk_size;
            let end = if i == workers - 1 {
                file_size
            } else {
                start + chunk_size
            };
            ByteRange::new(start, end)
        })
        .collect()
}

/// Outcome of a successful scan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanReport {
    /// Estimated number of distinct addresses
    pub estimate: u64,
    /// Number of lines holding a valid address
    pub lines: u64,
    /// Wall-clock time of the whole scan, merge included
    pub elapsed: Duration,
    /// Time spent merging worker sketches
    pub merge_elapsed: Duration,
    /// Number of workers actually used
    pub workers: usize,
    pub file_size: u64,
    pub precision: u8,
}

impl ScanReport {
    pub fn lines_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.lines as f64 / secs
        } else {
            0.0
        }
    }
}

/// Estimate the number of distinct IPv4 addresses in the file at `path`.
///
/// The file is split with [`split`] into `config.workers` ranges which are scanned
/// concurrently; their sketches are then merged into one. Fails if the precision is
/// invalid, if any worker fails, or if the final estimate exceeds [`MAX_ESTIMATE`].
pub fn count_unique(path: impl AsRef<Path>, config: &Config) -> Result<ScanReport> {
    let path = path.as_ref();
    let started = Instant::now();

    // validates precision before any worker is started
    let mut merged = HyperLogLog::new(config.precision)?;

    let file_size = fs::metadata(path)
        .map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?
        .len();

    let ranges = split(file_size, config.workers);
    if ranges.len() < config.workers {
        warn!(
            file_size,
            requested = config.workers,
            "file is smaller than the number of workers, using a single worker"
        );
    }
    let chunk_size = ranges.first().map_or(0, ByteRange::len);
    info!(
        file_size,
        workers = ranges.len(),
        "processing {} bytes with {} worker(s) ({:.2} MiB per worker)",
        file_size,
        ranges.len(),
        chunk_size as f64 / (1024.0 * 1024.0)
    );

    let progress = ProgressCounter::new();
    let outcomes = thread::scope(|s| {
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let progress = &progress;
        s.spawn(move || report_progress(progress, started, config.progress_interval, &done_rx));

        let handles: Vec<_> = ranges
            .iter()
            .enumerate()
            .map(|(worker, &range)| {
                debug!(worker, %range, "starting worker");
                s.spawn(move || {
                    let _span =
                        info_span!("worker", worker, start = range.start, end = range.end)
                            .entered();
                    let result = scan_file(path, range, config, progress);
                    if let Ok(chunk) = &result {
                        debug!(lines = chunk.lines, "worker finished");
                    }
                    result
                })
            })
            .collect();

        let outcomes: Vec<thread::Result<Result<ChunkResult>>> =
            handles.into_iter().map(|handle| handle.join()).collect();
        drop(done_tx);
        outcomes
    });

    let mut chunks = Vec::with_capacity(outcomes.len());
    for (worker, (outcome, &range)) in outcomes.into_iter().zip(&ranges).enumerate() {
        match outcome {
            Ok(Ok(chunk)) => chunks.push(chunk),
            Ok(Err(source)) => {
                return Err(Error::Worker {
                    worker,
                    range,
                    source: Box::new(source),
                })
            }
            Err(_) => return Err(Error::WorkerPanicked { worker }),
        }
    }

    let merge_started = Instant::now();
    let mut lines = 0;
    for chunk in chunks {
        merged.merge(&chunk.sketch)?;
        lines += chunk.lines;
    }
    let merge_elapsed = merge_started.elapsed();
    info!(?merge_elapsed, "merge completed");
    debug_assert_eq!(progress.get(), lines);

    let estimate = merged.estimate();
    if estimate > MAX_ESTIMATE {
        return Err(Error::EstimateOutOfRange(estimate));
    }

    Ok(ScanReport {
        estimate,
        lines,
        elapsed: started.elapsed(),
        merge_elapsed,
        workers: ranges.len(),
        file_size,
        precision: config.precision,
    })
}
