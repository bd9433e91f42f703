//! `ipv4-cardinality` estimates the number of distinct IPv4 addresses in large
//! line-oriented files without keeping the addresses themselves.
//!
//! The file is split into byte ranges that are scanned in parallel, each into its
//! own HyperLogLog sketch; the sketches are merged into a single estimate at the end.
//!
//! ```no_run
//! use ipv4_cardinality::{count_unique, Config};
//!
//! let config = Config::default().with_precision(14).with_workers(4);
//! let report = count_unique("ips.txt", &config)?;
//! println!("{} unique addresses in {} lines", report.estimate, report.lines);
//! # Ok::<(), ipv4_cardinality::Error>(())
//! ```
pub mod config;
pub mod error;
pub mod generator;
pub mod hash;
pub mod hyperloglog;
pub mod ipv4;
pub mod logging;
pub mod partition;
pub mod progress;
pub mod scanner;

pub use config::Config;
pub use error::{Error, Result};
pub use hyperloglog::HyperLogLog;
pub use ipv4::{parse_ipv4, to_ipv4_addr};
pub use partition::{count_unique, split, ByteRange, ScanReport};
