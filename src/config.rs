use std::time::Duration;

use crate::error::{Error, Result};
use crate::hyperloglog::{DEFAULT_PRECISION, MAX_PRECISION, MIN_PRECISION};

/// Scan settings shared by the coordinator and every worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// HyperLogLog precision, `[4..18]`
    pub precision: u8,
    /// Number of byte ranges scanned in parallel
    pub workers: usize,
    /// How often the reporting task logs progress
    pub progress_interval: Duration,
    /// Number of accepted lines a worker counts locally before publishing them
    pub progress_batch: u64,
    /// Capacity of each worker's read buffer in bytes
    pub read_buffer: usize,
    /// Longest line kept in memory, newline included. Longer lines are skipped.
    pub max_line: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            workers: 1,
            progress_interval: Duration::from_secs(2),
            progress_batch: 1_000_000,
            read_buffer: 1024 * 1024,
            max_line: 1024 * 1024,
        }
    }
}

impl Config {
    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// A batch of 0 is treated as 1 by the scanner.
    pub fn with_progress_batch(mut self, batch: u64) -> Self {
        self.progress_batch = batch;
        self
    }

    pub fn with_read_buffer(mut self, capacity: usize) -> Self {
        self.read_buffer = capacity;
        self
    }

    pub fn with_max_line(mut self, max_line: usize) -> Self {
        self.max_line = max_line;
        self
    }

    /// Reject settings a user supplied out of range instead of clamping them.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&self.precision) {
            return Err(Error::InvalidPrecision(self.precision));
        }
        if self.workers == 0 {
            return Err(Error::InvalidWorkerCount(self.workers));
        }
        Ok(())
    }

    /// Heap used by registers of all worker sketches, in bytes. Saturates at
    /// `usize::MAX` for precisions `validate` would reject.
    pub fn sketch_memory(&self) -> usize {
        1usize
            .checked_shl(u32::from(self.precision))
            .unwrap_or(usize::MAX)
            .saturating_mul(self.workers.max(1))
    }
}
