//! Hash input capability.
//!
//! The sketch never hashes on its own: callers hand in values that are already hashed and
//! assumed to be close to uniformly distributed. `Hash32` is the only thing the estimator
//! consumes. `Hash64` and `Fold64` let 64-bit hashers (e.g. `WyHash`) feed a 32-bit sketch.

use crate::bits::extract_bits_64;

/// Source of one 32-bit hash value.
pub trait Hash32 {
    fn sum32(&self) -> u32;
}

/// Source of one 64-bit hash value.
pub trait Hash64 {
    fn sum64(&self) -> u64;
}

impl Hash32 for u32 {
    #[inline]
    fn sum32(&self) -> u32 {
        *self
    }
}

impl Hash64 for u64 {
    #[inline]
    fn sum64(&self) -> u64 {
        *self
    }
}

impl<T: Hash32 + ?Sized> Hash32 for &T {
    #[inline]
    fn sum32(&self) -> u32 {
        (**self).sum32()
    }
}

/// Adapts a 64-bit hash into a 32-bit one by XOR-ing its high and low halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fold64<T>(pub T);

impl<T: Hash64> Hash32 for Fold64<T> {
    #[inline]
    fn sum32(&self) -> u32 {
        let h = self.0.sum64();
        (extract_bits_64(h, 64, 32) ^ extract_bits_64(h, 32, 0)) as u32
    }
}
