//! Bit-range extraction using LSB 0 numbering.
//!
//! `extract_bits_*(bits, hi, lo)` returns bits `[lo, hi)` of `bits` shifted down to position 0,
//! i.e. `lo` is inclusive and `hi` is exclusive. A span covering the whole word (`hi - lo` equal
//! to the word width) returns the word unchanged and an empty span returns 0; neither case shifts
//! by the full bit width.

/// Extract bits `[lo, hi)` from a 32-bit word.
#[inline]
pub(crate) fn extract_bits_32(bits: u32, hi: u32, lo: u32) -> u32 {
    debug_assert!(lo <= hi && hi <= u32::BITS);
    let width = hi - lo;
    if width == 0 {
        return 0;
    }
    let mask = if width >= u32::BITS {
        u32::MAX
    } else {
        (1 << width) - 1
    };
    (bits >> lo) & mask
}

/// Extract bits `[lo, hi)` from a 64-bit word.
#[inline]
pub(crate) fn extract_bits_64(bits: u64, hi: u32, lo: u32) -> u64 {
    debug_assert!(lo <= hi && hi <= u64::BITS);
    let width = hi - lo;
    if width == 0 {
        return 0;
    }
    let mask = if width >= u64::BITS {
        u64::MAX
    } else {
        (1 << width) - 1
    };
    (bits >> lo) & mask
}
