use std::io;
use std::path::PathBuf;

use crate::partition::ByteRange;

/// Errors produced while building sketches or scanning files.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("precision must be in [4..18] range, got {0}")]
    InvalidPrecision(u8),

    #[error("worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),

    #[error("cannot merge sketches with different precision ({left} and {right})")]
    PrecisionMismatch { left: u8, right: u8 },

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("worker {worker} failed on bytes {range}: {source}")]
    Worker {
        worker: usize,
        range: ByteRange,
        #[source]
        source: Box<Error>,
    },

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("estimate {0} exceeds the IPv4 address space")]
    EstimateOutOfRange(u64),

    #[error("unique ratio must be in (0, 1], got {0}")]
    InvalidUniqueRatio(f64),

    #[error("number of lines must be positive")]
    InvalidLineCount,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
