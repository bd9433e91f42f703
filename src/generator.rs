//! Synthetic input files: random dotted-quads drawn from a fixed pool.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::Ipv4Addr;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::{Error, Result};

/// Summary of a generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generated {
    /// Lines written
    pub lines: u64,
    /// Size of the address pool lines were drawn from, an upper bound on distinct addresses
    pub pool_size: usize,
}

/// Write `lines` addresses to `writer`, each drawn uniformly from a pool of
/// `max(1, lines * unique_ratio)` random addresses.
///
/// `unique_ratio` must lie in `(0, 1]`.
pub fn generate<W, R>(
    writer: &mut W,
    lines: u64,
    unique_ratio: f64,
    rng: &mut R,
) -> Result<Generated>
where
    W: Write,
    R: Rng,
{
    if lines == 0 {
        return Err(Error::InvalidLineCount);
    }
    if !(unique_ratio > 0.0 && unique_ratio <= 1.0) {
        return Err(Error::InvalidUniqueRatio(unique_ratio));
    }

    let pool_size = ((lines as f64 * unique_ratio) as usize).max(1);
    let pool: Vec<u32> = (0..pool_size).map(|_| rng.gen()).collect();
    info!(
        lines,
        pool_size,
        "generating {} lines with {} unique addresses ({:.1}% unique)",
        lines,
        pool_size,
        unique_ratio * 100.0
    );

    for i in 1..=lines {
        let addr = pool[rng.gen_range(0..pool_size)];
        writeln!(writer, "{}", Ipv4Addr::from(addr))?;
        if i % 1_000_000 == 0 {
            info!("generated {}M lines", i / 1_000_000);
        }
    }

    Ok(Generated { lines, pool_size })
}

/// Generate into a new file at `path`, seeding the generator with `seed` when given.
pub fn generate_file(
    path: &Path,
    lines: u64,
    unique_ratio: f64,
    seed: Option<u64>,
) -> Result<Generated> {
    let file = File::create(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut writer = BufWriter::new(file);
    let generated = generate(&mut writer, lines, unique_ratio, &mut rng)?;
    writer.flush()?;
    Ok(generated)
}
