//! 64-bit perceptual hash value.
//!
//! Every media fingerprint in this crate (image dHash, video frame aHash,
//! audio chunk aHash) is a 64-bit pattern. On the wire and in storage it is
//! rendered as 16 lowercase, zero-padded hex characters; bit 63 is the first
//! comparison made by the hasher.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::PerceptualError;

/// Number of bits in a [`Hash64`].
pub const HASH_BITS: u32 = 64;

/// A 64-bit perceptual hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash64(pub u64);

impl Hash64 {
    /// The all-zero pattern. For audio it marks a silent chunk.
    pub const ZERO: Hash64 = Hash64(0);

    /// Pack bits in order, first bit into the most significant position.
    ///
    /// Iterators shorter than 64 leave the low bits zero; longer ones are
    /// truncated.
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut value = 0u64;
        for (i, bit) in bits.into_iter().take(HASH_BITS as usize).enumerate() {
            if bit {
                value |= 1u64 << (63 - i);
            }
        }
        Hash64(value)
    }

    /// Number of differing bits.
    #[inline]
    pub fn hamming_distance(self, other: Hash64) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Render as 16 lowercase hex characters.
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }

    /// Parse exactly 16 hex characters (either case).
    pub fn from_hex(s: &str) -> Result<Self, PerceptualError> {
        if s.len() != 16 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PerceptualError::InvalidHashHex(s.to_string()));
        }
        u64::from_str_radix(s, 16)
            .map(Hash64)
            .map_err(|_| PerceptualError::InvalidHashHex(s.to_string()))
    }
}

impl fmt::Display for Hash64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for Hash64 {
    type Err = PerceptualError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash64::from_hex(s)
    }
}

impl Serialize for Hash64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash64::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
