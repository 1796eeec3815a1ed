//! Cardinality formula.
//!
//! The raw HyperLogLog estimate is `alpha(m) * m^2 / sum(2^-register)`. Three regimes apply,
//! checked in this order:
//! - `raw <= 2.5 * m` with at least one empty register: linear counting `m * ln(m / zeros)`.
//! - `raw < 2^32 / 30`: the raw estimate as is.
//! - otherwise: large-range correction `-2^32 * ln(1 - raw / 2^32)`.
//!
//! [Original HyperLogLog paper](http://algo.inria.fr/flajolet/Publications/FlFuGaMe07.pdf)

/// Size of the 32-bit hash space.
const TWO_32: f64 = 4_294_967_296.0;

/// Compute cardinality estimate from registers. Zero registers (a never constructed sketch)
/// estimate to 0. Estimates beyond the 32-bit hash space saturate to `u64::MAX`.
pub(crate) fn estimate(registers: &[u8]) -> u64 {
    if registers.is_empty() {
        return 0;
    }

    let raw = raw_estimate(registers);
    correct(raw, registers.len(), count_zeros(registers)) as u64
}

/// Pick the regime for `raw` given `m` registers of which `zeros` are empty.
#[inline]
fn correct(raw: f64, m: usize, zeros: usize) -> f64 {
    if raw <= 2.5 * (m as f64) {
        if zeros != 0 {
            return linear_counting(m, zeros);
        }
        raw
    } else if raw < TWO_32 / 30.0 {
        raw
    } else {
        large_range_correction(raw)
    }
}

/// Parameter for bias correction
#[inline]
pub(crate) fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / (m as f64)),
    }
}

/// Raw estimate `alpha(m) * m^2 / sum(2^-register)`.
#[inline]
pub(crate) fn raw_estimate(registers: &[u8]) -> f64 {
    let m = registers.len();
    let sum: f64 = registers.iter().map(|&r| 0.5f64.powi(i32::from(r))).sum();
    alpha(m) * (m as f64) * (m as f64) / sum
}

#[inline]
fn count_zeros(registers: &[u8]) -> usize {
    registers.iter().filter(|&&r| r == 0).count()
}

#[inline]
fn linear_counting(m: usize, zeros: usize) -> f64 {
    let m = m as f64;
    m * (m / zeros as f64).ln()
}

#[inline]
fn large_range_correction(raw: f64) -> f64 {
    // `ln(0)` is `-inf`, so a saturated raw estimate turns into `+inf` and casts to `u64::MAX`
    let ratio = (raw / TWO_32).min(1.0);
    -TWO_32 * (1.0 - ratio).ln()
}
