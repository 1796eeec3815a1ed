//! Validated precision parameter.
//!
//! Precision `p` is the number of leading hash bits used to pick a register, so a sketch has
//! `m = 2^p` registers and an expected relative error of `1.04 / sqrt(m)`:
//!
//! | p  | m      | memory   | error  |
//! |----|--------|----------|--------|
//! | 4  | 16     | 16 B     | 26.00% |
//! | 10 | 1024   | 1 KiB    | 3.25%  |
//! | 14 | 16384  | 16 KiB   | 0.81%  |
//! | 16 | 65536  | 64 KiB   | 0.41%  |

use std::fmt::{Display, Formatter};

use crate::error::{Error, Result};

/// Precision of a `HyperLogLog` sketch, always within `[Precision::MIN, Precision::MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precision(u8);

impl Precision {
    pub const MIN: Precision = Precision(4);
    pub const MAX: Precision = Precision(16);
    pub const DEFAULT: Precision = Precision(14);

    /// Create new precision, failing when `p` is outside of `[4, 16]`.
    #[inline]
    pub fn new(p: u8) -> Result<Self> {
        if !(Self::MIN.0..=Self::MAX.0).contains(&p) {
            return Err(Error::InvalidPrecision(p));
        }
        Ok(Self(p))
    }

    /// Smallest precision whose standard error does not exceed `error_rate`.
    pub fn from_error_rate(error_rate: f64) -> Result<Self> {
        if !(error_rate > 0.0 && error_rate < 1.0) {
            return Err(Error::InvalidErrorRate(error_rate));
        }
        let p = (2.0 * (1.04 / error_rate).log2()).ceil();
        if p > f64::from(Self::MAX.0) {
            return Err(Error::InvalidErrorRate(error_rate));
        }
        Ok(Self((p as u8).max(Self::MIN.0)))
    }

    /// Derive precision from number of registers.
    ///
    /// Out of range counts are checked first, so a length like `2^17` is reported as out of
    /// range rather than as a power-of-two problem.
    pub fn from_registers(len: usize) -> Result<Self> {
        if !(Self::MIN.registers()..=Self::MAX.registers()).contains(&len) {
            return Err(Error::RegisterCountOutOfRange(len));
        }
        if !len.is_power_of_two() {
            return Err(Error::RegisterCountNotPowerOfTwo(len));
        }
        Ok(Self(len.trailing_zeros() as u8))
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Number of registers `m = 2^p`.
    #[inline]
    pub fn registers(self) -> usize {
        1 << self.0
    }

    /// Expected relative standard error of the estimate.
    pub fn standard_error(self) -> f64 {
        1.04 / (self.registers() as f64).sqrt()
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Precision {
    type Error = Error;

    fn try_from(p: u8) -> Result<Self> {
        Self::new(p)
    }
}

impl From<Precision> for u8 {
    fn from(p: Precision) -> Self {
        p.0
    }
}

impl Display for Precision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
