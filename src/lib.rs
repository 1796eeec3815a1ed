//! `hll-sketch` is a Rust crate for estimating the number of distinct elements in a stream or
//! dataset using a small, fixed amount of memory.
//!
//! It implements the classic HyperLogLog over caller-supplied 32-bit hashes: `2^p` one-byte
//! registers, linear counting for small cardinalities, and large-range correction near the
//! saturation of the 32-bit hash space. Sketches of equal precision merge into the sketch of the
//! union of their streams, which makes per-shard counting followed by a merge the intended way to
//! scale out.
//!
//! ```rust
//! use hll_sketch::HyperLogLog;
//!
//! let mut lhs = HyperLogLog::<wyhash::WyHash>::new(14).unwrap();
//! let mut rhs = HyperLogLog::<wyhash::WyHash>::new(14).unwrap();
//! for i in 0..1000 {
//!     lhs.insert(&i);
//!     rhs.insert(&(i + 500));
//! }
//! lhs.merge(&rhs).unwrap();
//! let estimate = lhs.estimate() as f64;
//! assert!((estimate - 1500.0).abs() / 1500.0 < 0.05);
//!
//! let restored = HyperLogLog::from_bytes(&lhs.to_bytes()).unwrap();
//! assert_eq!(lhs, restored);
//! ```
mod bits;
mod codec;
pub mod error;
mod estimate;
pub mod hash;
pub mod hyperloglog;
pub mod precision;
#[cfg(feature = "with_serde")]
mod serde;

pub use error::{Error, Result};
pub use hash::{Fold64, Hash32, Hash64};
pub use hyperloglog::HyperLogLog;
pub use precision::Precision;
