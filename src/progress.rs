//! Shared line counter and the task that periodically logs it.
//!
//! Workers publish accepted lines in batches, so a read while the scan is running
//! is a lower bound. Once every worker has returned, the counter is exact.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::info;

/// Total number of accepted lines published by all workers.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    lines: Mutex<u64>,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&self, lines: u64) {
        if lines > 0 {
            *self.lines.lock() += lines;
        }
    }

    #[inline]
    pub fn get(&self) -> u64 {
        *self.lines.lock()
    }
}

/// Log progress every `interval` until `done` receives a message or its sender is dropped.
///
/// Returns the number of progress lines logged.
pub fn report_progress(
    counter: &ProgressCounter,
    started: Instant,
    interval: Duration,
    done: &Receiver<()>,
) -> usize {
    let mut reports = 0;
    loop {
        match done.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                let lines = counter.get();
                if lines == 0 {
                    continue;
                }
                let rate = lines as f64 / started.elapsed().as_secs_f64() / 1_000_000.0;
                info!(lines, "progress: {lines} lines processed ({rate:.2} M lines/sec)");
                reports += 1;
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return reports,
        }
    }
}
