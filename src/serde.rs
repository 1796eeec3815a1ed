//! # Serde module for HyperLogLog
//!
//! This module provides serde-based (serialization and deserialization) features for
//! `HyperLogLog`. Both directions delegate to the encodings of the `codec` module rather than
//! deriving a representation of their own:
//! - human-readable formats (e.g. JSON) get the base64 text form as a plain string,
//! - binary formats get the `(registers, m, p)` tuple, validated on the way back in.
//!
//! Refer to the serde documentation for more details on custom serialization and deserialization:
//! - [Serialization](https://serde.rs/impl-serialize.html)
//! - [Deserialization](https://serde.rs/impl-deserialize.html)
use std::hash::Hasher;

use serde::de::Error as _;
use serde::ser::{Error as _, SerializeTuple};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hyperloglog::HyperLogLog;

impl<H: Hasher + Default> Serialize for HyperLogLog<H> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            let text = self.to_text().map_err(S::Error::custom)?;
            return serializer.serialize_str(&text);
        }

        let mut tup = serializer.serialize_tuple(3)?;
        tup.serialize_element(&self.registers)?;
        tup.serialize_element(&(self.registers.len() as u32))?;
        tup.serialize_element(&self.p)?;
        tup.end()
    }
}

impl<'de, H: Hasher + Default> Deserialize<'de> for HyperLogLog<H> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            return Self::from_text(text).map_err(D::Error::custom);
        }

        let (registers, m, p): (Vec<u8>, u32, u8) = Deserialize::deserialize(deserializer)?;
        Self::from_parts(registers, m, p).map_err(D::Error::custom)
    }
}
