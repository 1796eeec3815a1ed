//! HyperLogLog sketch over 32-bit hashes.
//!
//! A sketch holds `m = 2^p` registers, one byte each, for precision `p` in `[4..16]` range.
//! Every observed hash is split into:
//! - bits 32-p..31 - register index
//! - bits 0..32-p  - remaining bits, whose leading zero count plus one is the rank
//!
//! The register keeps the maximum rank seen so far, so registers only ever grow until `clear`.
//! Merging takes the element-wise maximum of two register arrays, which yields the same state as
//! if both streams had been fed into one sketch.
//!
//! Memory is `m` bytes for registers. Expected error is `1.04 / sqrt(m)`:
//!   P = 10: 1.04 / sqrt(2^10) = 3.25%
//!   P = 14: 1.04 / sqrt(2^14) = 0.81%
//!   P = 16: 1.04 / sqrt(2^16) = 0.41%
//!
//! A sketch is a plain value and is not synchronized. Mutation takes `&mut self`, so concurrent
//! writers are rejected at compile time. To count on several threads, keep one sketch per
//! thread and fold them with `merge_all`.

use std::fmt::{Debug, Formatter};
use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};
use std::mem::size_of;

use tracing::debug;
use wyhash::WyHash;

use crate::bits::extract_bits_32;
use crate::error::{Error, Result};
use crate::estimate::estimate;
use crate::hash::{Fold64, Hash32};
use crate::precision::Precision;

pub struct HyperLogLog<H: Hasher + Default = WyHash> {
    /// Register ranks, `2^p` of them, or none for the zero-value sketch
    pub(crate) registers: Vec<u8>,
    /// Precision, 0 only for the zero-value sketch
    pub(crate) p: u8,
    /// Zero-sized build hasher used by `insert`
    build_hasher: BuildHasherDefault<H>,
}

impl<H: Hasher + Default> HyperLogLog<H> {
    /// Creates new sketch with `2^p` empty registers.
    #[inline]
    pub fn new(p: u8) -> Result<Self> {
        Ok(Self::with_precision(Precision::new(p)?))
    }

    /// Creates new sketch for already validated precision.
    #[inline]
    pub fn with_precision(precision: Precision) -> Self {
        Self::from_raw_parts(vec![0; precision.registers()], precision.get())
    }

    /// Creates new sketch with the smallest precision meeting given standard error.
    pub fn with_error_rate(error_rate: f64) -> Result<Self> {
        Ok(Self::with_precision(Precision::from_error_rate(error_rate)?))
    }

    /// Creates sketch which uses given buffer as its registers.
    ///
    /// Buffer length must be a power of two within `[16, 65536]`; precision is derived from it.
    pub fn from_registers(registers: Vec<u8>) -> Result<Self> {
        match Precision::from_registers(registers.len()) {
            Ok(precision) => Ok(Self::from_raw_parts(registers, precision.get())),
            Err(err) => {
                debug!(len = registers.len(), reason = %err, "rejected register buffer");
                Err(err)
            }
        }
    }

    #[inline]
    pub(crate) fn from_raw_parts(registers: Vec<u8>, p: u8) -> Self {
        debug_assert!(
            (registers.is_empty() && p == 0) || registers.len() == 1 << p,
            "register count must be 2^p"
        );
        Self {
            registers,
            p,
            build_hasher: BuildHasherDefault::default(),
        }
    }

    /// Return precision `p`, 0 for the zero-value sketch
    #[inline]
    pub fn precision(&self) -> u8 {
        self.p
    }

    /// Return number of registers `m`
    #[inline]
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// Return whether the sketch has no registers, i.e. `len() == 0` (the zero-value sketch)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Return whether no element has been observed since construction or the last `clear`
    #[inline]
    pub fn is_clear(&self) -> bool {
        self.registers.iter().all(|&r| r == 0)
    }

    /// Return raw registers
    #[inline]
    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Consume sketch and return its registers
    #[inline]
    pub fn into_registers(self) -> Vec<u8> {
        self.registers
    }

    /// Add one hashed element.
    #[inline]
    pub fn add<T: Hash32 + ?Sized>(&mut self, item: &T) {
        self.insert_hash(item.sum32());
    }

    /// Add every hashed element of `items`.
    pub fn add_all<I>(&mut self, items: I)
    where
        I: IntoIterator,
        I::Item: Hash32,
    {
        for item in items {
            self.add(&item);
        }
    }

    /// Insert a hashable item, hashing it with `H` first.
    #[inline]
    pub fn insert<T: Hash + ?Sized>(&mut self, item: &T) {
        let mut hasher = self.build_hasher.build_hasher();
        item.hash(&mut hasher);
        self.add(&Fold64(hasher.finish()));
    }

    /// Insert a raw 32-bit hash. Zero-value sketch has no registers and ignores it.
    #[inline]
    pub fn insert_hash(&mut self, h: u32) {
        if self.registers.is_empty() {
            return;
        }
        let (idx, rank) = decode_hash(h, self.p);
        // `idx` is the top `p` bits of `h`, always below `2^p`
        let register = &mut self.registers[idx];
        if rank > *register {
            *register = rank;
        }
    }

    /// Return cardinality estimate
    #[inline]
    pub fn estimate(&self) -> u64 {
        estimate(&self.registers)
    }

    /// Merge `rhs` into `self`, so `self` estimates the union of both streams.
    pub fn merge(&mut self, rhs: &Self) -> Result<()> {
        if self.p != rhs.p {
            debug!(lhs = self.p, rhs = rhs.p, "rejected merge of different precisions");
            return Err(Error::PrecisionMismatch {
                lhs: self.p,
                rhs: rhs.p,
            });
        }
        debug_assert_eq!(self.registers.len(), rhs.registers.len());
        for (lhs, &rhs) in self.registers.iter_mut().zip(rhs.registers.iter()) {
            if rhs > *lhs {
                *lhs = rhs;
            }
        }
        Ok(())
    }

    /// Merge every sketch of `shards` into `self`, stopping at the first precision mismatch.
    pub fn merge_all<'a, I>(&mut self, shards: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Self>,
        Self: 'a,
    {
        shards.into_iter().try_for_each(|shard| self.merge(shard))
    }

    /// Reset every register to zero, keeping precision and allocated buffer.
    #[inline]
    pub fn clear(&mut self) {
        self.registers.fill(0);
    }

    /// Return independent copy of the sketch.
    #[inline]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Return memory size of `HyperLogLog`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + self.registers.capacity()
    }
}

/// Split hash into register index (top `p` bits) and rank of the remaining `32 - p` bits.
///
/// The remaining bits are shifted to the top and bit `p - 1` is set as a sentinel, so the rank
/// is at most `32 - p + 1` even when all remaining bits are zero.
#[inline]
fn decode_hash(h: u32, p: u8) -> (usize, u8) {
    let p = u32::from(p);
    let idx = extract_bits_32(h, 32, 32 - p) as usize;
    let w = (h << p) | (1 << (p - 1));
    let rank = w.leading_zeros() as u8 + 1;
    (idx, rank)
}

impl<H: Hasher + Default> Default for HyperLogLog<H> {
    /// Zero-value sketch without registers: estimates 0 and ignores inserts.
    fn default() -> Self {
        Self::from_raw_parts(Vec::new(), 0)
    }
}

impl<H: Hasher + Default> Clone for HyperLogLog<H> {
    fn clone(&self) -> Self {
        Self::from_raw_parts(self.registers.clone(), self.p)
    }
}

impl<H: Hasher + Default> PartialEq for HyperLogLog<H> {
    fn eq(&self, rhs: &Self) -> bool {
        self.p == rhs.p && self.registers == rhs.registers
    }
}

impl<H: Hasher + Default> Eq for HyperLogLog<H> {}

impl<H: Hasher + Default> Debug for HyperLogLog<H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ precision: {}, estimate: {}, size: {} }}",
            self.p,
            self.estimate(),
            self.size_of()
        )
    }
}

impl<H: Hasher + Default> TryFrom<Vec<u8>> for HyperLogLog<H> {
    type Error = Error;

    fn try_from(registers: Vec<u8>) -> Result<Self> {
        Self::from_registers(registers)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use test_case::test_case;

    /// Multiplicative hashing of consecutive integers spreads their top bits evenly.
    fn spread(i: u32) -> u32 {
        i.wrapping_mul(0x9e37_79b9)
    }

    #[test_case(4 => "{ precision: 4, estimate: 0, size: 48 }")]
    #[test_case(10 => "{ precision: 10, estimate: 0, size: 1056 }")]
    #[test_case(16 => "{ precision: 16, estimate: 0, size: 65568 }")]
    fn test_new(p: u8) -> String {
        let hll = HyperLogLog::<WyHash>::new(p).unwrap();
        assert_eq!(hll.len(), 1 << p);
        assert!(hll.registers().iter().all(|&r| r == 0));
        assert!(hll.is_clear());
        assert!(!hll.is_empty());
        format!("{:?}", hll)
    }

    #[test]
    fn test_new_all_precisions() {
        for p in 0..=u8::MAX {
            let hll = HyperLogLog::<WyHash>::new(p);
            if (4..=16).contains(&p) {
                let hll = hll.unwrap();
                assert_eq!(hll.precision(), p);
                assert_eq!(hll.len(), 1 << p);
                assert_eq!(hll.estimate(), 0);
            } else {
                assert!(matches!(hll, Err(Error::InvalidPrecision(v)) if v == p));
            }
        }
    }

    #[test]
    fn test_with_error_rate() {
        let hll = HyperLogLog::<WyHash>::with_error_rate(0.02).unwrap();
        assert_eq!(hll.precision(), 12);
        assert!(HyperLogLog::<WyHash>::with_error_rate(0.0001).is_err());
    }

    #[test]
    fn test_add_p16() {
        let mut hll = HyperLogLog::<WyHash>::new(16).unwrap();

        hll.insert_hash(0x0001_0fff);
        assert_eq!(hll.registers()[1], 5);

        hll.insert_hash(0x0002_ffff);
        assert_eq!(hll.registers()[2], 1);

        hll.insert_hash(0x0003_0000);
        assert_eq!(hll.registers()[3], 17);

        hll.insert_hash(0x0003_0001);
        assert_eq!(hll.registers()[3], 17);

        hll.insert_hash(0xff03_7000);
        assert_eq!(hll.registers()[0xff03], 2);

        hll.insert_hash(0xff03_0800);
        assert_eq!(hll.registers()[0xff03], 5);
    }

    #[test]
    fn test_add_p4() {
        let mut hll = HyperLogLog::<WyHash>::new(4).unwrap();

        hll.insert_hash(0x1fff_ffff);
        assert_eq!(hll.registers()[1], 1);

        hll.insert_hash(0xffff_ffff);
        assert_eq!(hll.registers()[0xf], 1);

        hll.insert_hash(0x00ff_ffff);
        assert_eq!(hll.registers()[0], 5);

        // all bits below the index are zero: rank is capped by the sentinel bit
        hll.insert_hash(0x2000_0000);
        assert_eq!(hll.registers()[2], 29);
    }

    #[test_case(0x0001_0fff, 16 => (1, 5))]
    #[test_case(0x0003_0000, 16 => (3, 17))]
    #[test_case(0xffff_ffff, 16 => (0xffff, 1))]
    #[test_case(0x0000_0000, 4 => (0, 29))]
    #[test_case(0x0000_0000, 16 => (0, 17))]
    #[test_case(0x8000_0000, 11 => (1024, 22))]
    fn test_decode_hash(h: u32, p: u8) -> (usize, u8) {
        decode_hash(h, p)
    }

    #[test]
    fn test_add_duplicate() {
        let mut once = HyperLogLog::<WyHash>::new(12).unwrap();
        once.insert_hash(0xdead_beef);
        let mut twice = HyperLogLog::<WyHash>::new(12).unwrap();
        twice.insert_hash(0xdead_beef);
        twice.insert_hash(0xdead_beef);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_add_trait() {
        let mut by_trait = HyperLogLog::<WyHash>::new(10).unwrap();
        by_trait.add(&0x0001_0fffu32);
        by_trait.add_all([0x0002_0fffu32, 0x0003_0fff]);
        let mut by_hash = HyperLogLog::<WyHash>::new(10).unwrap();
        for h in [0x0001_0fff, 0x0002_0fff, 0x0003_0fff] {
            by_hash.insert_hash(h);
        }
        assert_eq!(by_trait, by_hash);
    }

    #[test]
    fn test_estimate_small_exact() {
        for p in 11..=16 {
            let mut hll = HyperLogLog::<WyHash>::new(p).unwrap();
            assert_eq!(hll.estimate(), 0);
            for i in 1..=8u32 {
                hll.insert_hash(spread(i));
                assert_eq!(hll.estimate(), u64::from(i), "p = {}", p);
            }
        }
    }

    #[test]
    fn test_insert() {
        // Create a new HyperLogLog.
        let mut e = HyperLogLog::<WyHash>::new(12).unwrap();

        // Ensure initial estimate is 0.
        assert_eq!(e.estimate(), 0);

        // Insert a test item and validate estimate.
        e.insert("test item 1");
        assert_eq!(e.estimate(), 1);

        // Re-insert the same item, estimate should remain the same.
        e.insert("test item 1");
        assert_eq!(e.estimate(), 1);

        // Insert a new distinct item, estimate should increase.
        e.insert("test item 2");
        assert_eq!(e.estimate(), 2);
    }

    #[test_case(10, 1_000)]
    #[test_case(10, 100_000)]
    #[test_case(14, 10_000)]
    #[test_case(14, 1_000_000)]
    #[test_case(16, 100_000)]
    fn test_estimate_error(p: u8, n: usize) {
        let mut hll = HyperLogLog::<WyHash>::new(p).unwrap();
        for i in 0..n {
            hll.insert(&i);
        }
        let expected = n as f64;
        let relative_error = (hll.estimate() as f64 - expected).abs() / expected;
        let bound = 5.0 * Precision::new(p).unwrap().standard_error();
        assert!(
            relative_error < bound,
            "p = {}, n = {}, estimate = {}, err = {:.4}",
            p,
            n,
            hll.estimate(),
            relative_error
        );
    }

    #[test]
    fn test_merge() {
        let mut hll = HyperLogLog::<WyHash>::new(16).unwrap();
        for h in [0x0001_0fff, 0x0002_0fff, 0x0003_0fff, 0x0004_0fff, 0x0005_0fff, 0x0005_0fff] {
            hll.insert_hash(h);
        }

        let mut hll2 = HyperLogLog::<WyHash>::new(16).unwrap();
        hll2.merge(&hll).unwrap();
        assert_eq!(hll2.estimate(), 5);

        hll2.merge(&hll).unwrap();
        assert_eq!(hll2.estimate(), 5);

        for h in [0x0006_0fff, 0x0007_0fff, 0x0008_0fff, 0x0009_0fff, 0x000a_0fff, 0x000a_0fff] {
            hll.insert_hash(h);
        }
        assert_eq!(hll.estimate(), 10);

        hll2.merge(&hll).unwrap();
        assert_eq!(hll2.estimate(), 10);
    }

    #[test]
    fn test_merge_precision_mismatch() {
        let mut hll = HyperLogLog::<WyHash>::new(16).unwrap();
        let hll2 = HyperLogLog::<WyHash>::new(10).unwrap();
        assert!(matches!(
            hll.merge(&hll2),
            Err(Error::PrecisionMismatch { lhs: 16, rhs: 10 })
        ));

        let mut zero = HyperLogLog::<WyHash>::default();
        assert!(matches!(
            zero.merge(&hll),
            Err(Error::PrecisionMismatch { lhs: 0, rhs: 16 })
        ));
    }

    #[test]
    fn test_merge_dominated_is_noop() {
        let mut big = HyperLogLog::<WyHash>::new(8).unwrap();
        let mut small = HyperLogLog::<WyHash>::new(8).unwrap();
        for i in 0..100 {
            big.insert(&i);
            if i % 3 == 0 {
                small.insert(&i);
            }
        }
        let before = big.clone();
        big.merge(&small).unwrap();
        assert_eq!(big, before);
    }

    #[test]
    fn test_merge_all() {
        let shards: Vec<HyperLogLog> = (0..4)
            .map(|shard| {
                let mut hll = HyperLogLog::new(12).unwrap();
                for i in 0..1000 {
                    hll.insert(&(shard * 1000 + i));
                }
                hll
            })
            .collect();

        let mut merged = HyperLogLog::<WyHash>::new(12).unwrap();
        merged.merge_all(&shards).unwrap();

        let mut single = HyperLogLog::<WyHash>::new(12).unwrap();
        for i in 0..4000 {
            single.insert(&i);
        }
        assert_eq!(merged, single);

        let mut wrong = vec![HyperLogLog::<WyHash>::new(10).unwrap()];
        wrong.extend(shards);
        assert!(merged.merge_all(&wrong).is_err());
    }

    #[test]
    fn test_clear() {
        let mut hll = HyperLogLog::<WyHash>::new(16).unwrap();
        hll.insert_hash(0x0001_0fff);
        assert_eq!(hll.estimate(), 1);
        let added = hll.clone();

        assert!(!hll.is_clear());

        hll.clear();
        assert!(hll.is_clear());
        assert_eq!(hll.estimate(), 0);
        assert_eq!(hll.len(), 1 << 16);
        assert_eq!(hll, HyperLogLog::<WyHash>::new(16).unwrap());

        hll.insert_hash(0x0001_0fff);
        assert_eq!(hll.estimate(), 1);
        assert_eq!(hll, added);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut hll = HyperLogLog::<WyHash>::new(8).unwrap();
        hll.insert_hash(0x0100_0000);
        let copy = hll.copy();
        assert_eq!(copy, hll);

        hll.insert_hash(0x0200_0000);
        hll.clear();
        assert_eq!(copy.registers()[1], 25);
        assert_ne!(copy, hll);
    }

    #[test]
    fn test_from_registers() {
        let mut hll = HyperLogLog::<WyHash>::new(16).unwrap();
        for h in [0x0001_0fff, 0x0002_0fff, 0x0003_0fff, 0x0004_0fff, 0x0005_0fff] {
            hll.insert_hash(h);
        }

        let hll2 = HyperLogLog::<WyHash>::from_registers(hll.registers().to_vec()).unwrap();
        assert_eq!(hll2.precision(), 16);
        assert_eq!(hll, hll2);
    }

    #[test_case(1 << 3 => "out of range")]
    #[test_case(1 << 17 => "out of range")]
    #[test_case(17 => "not power of two")]
    #[test_case(100 => "not power of two")]
    fn test_from_registers_invalid(len: usize) -> &'static str {
        match HyperLogLog::<WyHash>::from_registers(vec![0; len]) {
            Err(Error::RegisterCountOutOfRange(l)) if l == len => "out of range",
            Err(Error::RegisterCountNotPowerOfTwo(l)) if l == len => "not power of two",
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_zero_value() {
        let mut hll = HyperLogLog::<WyHash>::default();
        assert_eq!(hll.len(), 0);
        assert!(hll.is_empty());
        assert!(hll.is_clear());
        assert_eq!(hll.precision(), 0);
        assert_eq!(hll.estimate(), 0);
        hll.insert_hash(0xdead_beef);
        hll.insert("item");
        assert_eq!(hll.estimate(), 0);
        hll.merge(&HyperLogLog::default()).unwrap();
        assert_eq!(hll, HyperLogLog::default());
    }
}
