//! Errors returned by sketch construction, merging and decoding.
//!
//! Every variant is a deterministic data-validation failure: the caller fixes the input and
//! retries. Nothing here is transient.

use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("precision {0} is out of range, must be within [4, 16]")]
    InvalidPrecision(u8),

    #[error("error rate {0} can not be achieved with precision in [4, 16]")]
    InvalidErrorRate(f64),

    #[error("number of registers {0} is out of range, must be within [16, 65536]")]
    RegisterCountOutOfRange(usize),

    #[error("number of registers {0} is not a power of two")]
    RegisterCountNotPowerOfTwo(usize),

    #[error("can not merge sketches with different precisions ({lhs} and {rhs})")]
    PrecisionMismatch { lhs: u8, rhs: u8 },

    #[error("malformed base64 text: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("binary input is truncated")]
    Truncated,

    #[error("binary input has {0} unexpected trailing bytes")]
    TrailingBytes(usize),

    #[error("inconsistent binary header: {len} registers, m = {m}, p = {p}")]
    InconsistentHeader { len: usize, m: u32, p: u8 },

    #[error("zero-value sketch has no registers to encode")]
    Uninitialized,

    #[error("i/o error: {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::Truncated,
            _ => Error::Io(err),
        }
    }
}
