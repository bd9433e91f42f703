//! ## HyperLogLog sketch
//! Estimates the number of distinct IPv4 addresses with `M = 2^P` registers,
//! where `P` is the precision parameter in `[4..18]` range.
//!
//! [Original HyperLogLog paper](https://algo.inria.fr/flajolet/Publications/FlFuGaMe07.pdf)
//!
//! Each address is mixed with [`fmix32`](crate::hash::fmix32); the top `P` bits of the
//! hash select a register and the register keeps the maximum rank seen, where rank is
//! `1 + leading zeros` of the remaining `32 - P` bits. Registers are stored one per
//! byte, so a sketch occupies `M` bytes of heap:
//!
//! | P  | registers | memory | standard error |
//! |----|-----------|--------|----------------|
//! | 10 | 1024      | 1 KiB  | 3.25%          |
//! | 12 | 4096      | 4 KiB  | 1.62%          |
//! | 14 | 16384     | 16 KiB | 0.81%          |
//! | 18 | 262144    | 256 KiB| 0.20%          |
//!
//! Estimation uses the three-region HyperLogLog estimator: linear counting for small
//! cardinalities, the raw harmonic mean in the middle, and the `2^32` hash-space
//! correction for large cardinalities.

use std::fmt::{Debug, Formatter};
use std::mem::size_of;

use crate::error::{Error, Result};
use crate::hash::fmix32;

/// Smallest supported precision.
pub const MIN_PRECISION: u8 = 4;
/// Largest supported precision.
pub const MAX_PRECISION: u8 = 18;
/// Precision used when none is configured.
pub const DEFAULT_PRECISION: u8 = 14;

/// Size of the 32-bit hash space.
const TWO_32: f64 = 4_294_967_296.0;

/// HyperLogLog sketch over encoded IPv4 addresses.
#[derive(Clone)]
pub struct HyperLogLog {
    /// Number of hash bits used for register indices
    precision: u8,
    /// One rank per register, never decreasing
    registers: Box<[u8]>,
    /// `alpha(M) * M^2`, numerator of the raw estimate
    alpha_mm: f64,
}

impl HyperLogLog {
    /// Creates an empty sketch with `2^precision` registers.
    ///
    /// Fails with [`Error::InvalidPrecision`] when `precision` is outside `[4..18]`.
    pub fn new(precision: u8) -> Result<Self> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(Error::InvalidPrecision(precision));
        }
        let m = 1usize << precision;
        let alpha_mm = alpha(m) * (m as f64) * (m as f64);

        Ok(Self {
            precision,
            registers: vec![0u8; m].into_boxed_slice(),
            alpha_mm,
        })
    }

    /// Insert encoded IPv4 address into the sketch
    #[inline]
    pub fn add(&mut self, addr: u32) {
        let (idx, rank) = self.index_and_rank(fmix32(addr));
        let register = &mut self.registers[idx];
        if rank > *register {
            *register = rank;
        }
    }

    /// Split hash into register index (top `P` bits) and rank of the remaining bits
    #[inline]
    fn index_and_rank(&self, hash: u32) -> (usize, u8) {
        let p = u32::from(self.precision);
        let idx = (hash >> (32 - p)) as usize;
        let rank = (hash << p).leading_zeros().min(32 - p) + 1;
        (idx, rank as u8)
    }

    /// Merge `rhs` into `self` by taking the per-register maximum.
    ///
    /// The result does not depend on merge order, so any number of partial sketches
    /// can be folded together in any order.
    pub fn merge(&mut self, rhs: &HyperLogLog) -> Result<()> {
        if self.precision != rhs.precision {
            return Err(Error::PrecisionMismatch {
                left: self.precision,
                right: rhs.precision,
            });
        }
        // plain zip/max loop is auto-vectorized
        for (lhs, &rhs) in self.registers.iter_mut().zip(rhs.registers.iter()) {
            *lhs = (*lhs).max(rhs);
        }
        Ok(())
    }

    /// Return cardinality estimate.
    ///
    /// Returns `u64::MAX` once the raw estimate reaches the size of the hash space,
    /// where the large-range correction is undefined.
    pub fn estimate(&self) -> u64 {
        let m = self.registers.len() as f64;
        let (sum, zeros) = self
            .registers
            .iter()
            .fold((0.0f64, 0usize), |(sum, zeros), &rank| {
                (
                    sum + 1.0 / ((1u64 << rank) as f64),
                    zeros + usize::from(rank == 0),
                )
            });
        let raw = self.alpha_mm / sum;

        let estimate = if raw <= 2.5 * m {
            if zeros != 0 {
                // linear counting
                m * (m / zeros as f64).ln()
            } else {
                raw
            }
        } else if raw <= TWO_32 / 30.0 {
            raw
        } else {
            let ratio = raw / TWO_32;
            if ratio >= 1.0 {
                return u64::MAX;
            }
            -TWO_32 * (1.0 - ratio).ln()
        };

        estimate as u64
    }

    /// Reset all registers to zero
    pub fn clear(&mut self) {
        self.registers.fill(0);
    }

    /// Return precision of the sketch
    #[inline]
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Return number of registers
    #[inline]
    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// Return register ranks
    #[inline]
    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Return whether no address has been inserted yet
    pub fn is_empty(&self) -> bool {
        self.registers.iter().all(|&rank| rank == 0)
    }

    /// Expected relative standard error, `1.04 / sqrt(M)`
    pub fn standard_error(&self) -> f64 {
        1.04 / (self.registers.len() as f64).sqrt()
    }

    /// Return memory size of the sketch including its registers
    pub fn memory_size(&self) -> usize {
        size_of::<Self>() + self.registers.len()
    }
}

impl PartialEq for HyperLogLog {
    fn eq(&self, rhs: &Self) -> bool {
        self.precision == rhs.precision && self.registers == rhs.registers
    }
}

impl Eq for HyperLogLog {}

impl Debug for HyperLogLog {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ precision: {}, estimate: {}, size: {} }}",
            self.precision,
            self.estimate(),
            self.memory_size()
        )
    }
}

/// Parameter for bias correction
#[inline]
fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / (m as f64)),
    }
}
