//! Binary and text encodings of `HyperLogLog`.
//!
//! Binary layout, little-endian, each field framed by its own fixed width or length prefix:
//! - u32           - number of registers `N`
//! - u8 * N        - registers
//! - u32           - `m`, must equal `N`
//! - u8            - `p`, must equal `log2(m)`
//!
//! The zero-value sketch encodes as `N = 0, m = 0, p = 0`.
//!
//! Text form is standard padded base64 of the registers only. Precision is not stored and is
//! derived from the decoded length exactly as `HyperLogLog::from_registers` does.

use std::hash::Hasher;
use std::io::{Read, Write};
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::debug;

use crate::error::{Error, Result};
use crate::hyperloglog::HyperLogLog;
use crate::precision::Precision;

impl<H: Hasher + Default> HyperLogLog<H> {
    /// Write binary encoding into `writer`
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.registers.len() as u32)?;
        writer.write_all(&self.registers)?;
        writer.write_u32::<LittleEndian>(self.registers.len() as u32)?;
        writer.write_u8(self.p)?;
        Ok(())
    }

    /// Read one binary encoded sketch from `reader`
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let len = reader.read_u32::<LittleEndian>()? as usize;
        if len > Precision::MAX.registers() {
            debug!(len, "rejected binary sketch with too many registers");
            return Err(Error::RegisterCountOutOfRange(len));
        }
        let mut registers = vec![0; len];
        reader.read_exact(&mut registers)?;
        let m = reader.read_u32::<LittleEndian>()?;
        let p = reader.read_u8()?;
        Self::from_parts(registers, m, p)
    }

    /// Encode sketch into bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = (self.registers.len() as u32).to_le_bytes();
        let mut buf = Vec::with_capacity(self.registers.len() + 9);
        buf.extend_from_slice(&len);
        buf.extend_from_slice(&self.registers);
        buf.extend_from_slice(&len);
        buf.push(self.p);
        buf
    }

    /// Decode sketch from bytes produced by `to_bytes`, rejecting any trailing bytes
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
        let hll = Self::read_from(&mut bytes)?;
        if !bytes.is_empty() {
            debug!(trailing = bytes.len(), "rejected binary sketch with trailing bytes");
            return Err(Error::TrailingBytes(bytes.len()));
        }
        Ok(hll)
    }

    /// Rebuild sketch from explicitly stored registers, `m` and `p`, checking they agree.
    pub(crate) fn from_parts(registers: Vec<u8>, m: u32, p: u8) -> Result<Self> {
        let len = registers.len();
        if len != m as usize {
            debug!(len, m, p, "rejected binary sketch with mismatched register count");
            return Err(Error::InconsistentHeader { len, m, p });
        }
        if len == 0 {
            if p != 0 {
                debug!(len, m, p, "rejected binary zero-value sketch with precision");
                return Err(Error::InconsistentHeader { len, m, p });
            }
            return Ok(Self::default());
        }
        let hll = Self::from_registers(registers)?;
        if hll.p != p {
            debug!(len, m, p, "rejected binary sketch with mismatched precision");
            return Err(Error::InconsistentHeader { len, m, p });
        }
        Ok(hll)
    }

    /// Encode registers as standard padded base64.
    ///
    /// The zero-value sketch has nothing to encode and fails with `Error::Uninitialized`.
    pub fn to_text(&self) -> Result<String> {
        if self.registers.is_empty() {
            return Err(Error::Uninitialized);
        }
        Ok(STANDARD.encode(&self.registers))
    }

    /// Decode sketch from text produced by `to_text`
    pub fn from_text<T: AsRef<[u8]>>(text: T) -> Result<Self> {
        let registers = STANDARD.decode(text).map_err(|err| {
            debug!(reason = %err, "rejected malformed base64 sketch");
            Error::from(err)
        })?;
        Self::from_registers(registers)
    }
}

impl<H: Hasher + Default> FromStr for HyperLogLog<H> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_text(s)
    }
}
