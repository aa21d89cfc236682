//! Core types for fairdraw

use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// SHA-256 output width
pub const DIGEST_SIZE: usize = 32;

/// Tie-break rounds before falling back to the minimum ticket id
pub const DEFAULT_TIE_BREAKER_ROUNDS: u32 = 3;
pub const MAX_TIE_BREAKER_ROUNDS: u32 = 64;

/// Participant ticket number
pub type TicketId = u64;

/// Raw digest bytes
pub type Hash = [u8; DIGEST_SIZE];

/// Errors that can occur while computing or checking a draw
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LotteryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Incomplete hash material: expected {expected} hashes, got {got}")]
    IncompleteHashMaterial { expected: usize, got: usize },

    #[error("Hash source failed: {0}")]
    HashSource(String),

    #[error("Invalid score: {0}")]
    InvalidScore(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Draw seed: SHA-256 over the concatenated block hashes
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed(Hash);

impl Seed {
    pub fn from_bytes(bytes: Hash) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Lowercase hex, the form every score is derived from
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({})", self.to_hex())
    }
}

impl FromStr for Seed {
    type Err = LotteryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)
            .map_err(|e| LotteryError::InvalidInput(format!("seed is not hex: {}", e)))?;
        let bytes: Hash = bytes.try_into().map_err(|v: Vec<u8>| {
            LotteryError::InvalidInput(format!(
                "seed must be {} bytes, got {}",
                DIGEST_SIZE,
                v.len()
            ))
        })?;
        let seed = Self(bytes);
        // Scores hash the seed text, so only the exact emitted form is accepted
        if seed.to_hex() != s {
            return Err(LotteryError::InvalidInput(format!(
                "seed must be lowercase hex: {:?}",
                s
            )));
        }
        Ok(seed)
    }
}

impl Serialize for Seed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// 256-bit unsigned score, stored big-endian
///
/// Byte-wise ordering of a fixed-width big-endian array is the same as
/// unsigned integer ordering, so the derived `Ord` compares full width.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(Hash);

impl Score {
    pub const MIN: Score = Score([0u8; DIGEST_SIZE]);
    pub const MAX: Score = Score([0xffu8; DIGEST_SIZE]);

    pub fn from_be_bytes(bytes: Hash) -> Self {
        Self(bytes)
    }

    pub fn to_be_bytes(&self) -> Hash {
        self.0
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    pub fn to_decimal(&self) -> String {
        self.to_biguint().to_str_radix(10)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse canonical decimal text: digits only, no sign, no leading zeros.
    /// Values wider than 256 bits are rejected.
    pub fn from_decimal(s: &str) -> Result<Self, LotteryError> {
        let canonical = !s.is_empty()
            && s.bytes().all(|b| b.is_ascii_digit())
            && (s == "0" || !s.starts_with('0'));
        if !canonical {
            return Err(LotteryError::InvalidScore(format!(
                "not a canonical decimal integer: {:?}",
                s
            )));
        }
        let value = BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| LotteryError::InvalidScore(format!("not a decimal integer: {:?}", s)))?;
        Self::try_from(value)
    }
}

impl TryFrom<BigUint> for Score {
    type Error = LotteryError;

    fn try_from(value: BigUint) -> Result<Self, Self::Error> {
        let bytes = value.to_bytes_be();
        if bytes.len() > DIGEST_SIZE {
            return Err(LotteryError::InvalidScore(format!(
                "value needs {} bytes, max {}",
                bytes.len(),
                DIGEST_SIZE
            )));
        }
        let mut out = [0u8; DIGEST_SIZE];
        out[DIGEST_SIZE - bytes.len()..].copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score({})", self.to_decimal())
    }
}

impl FromStr for Score {
    type Err = LotteryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal(s)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_decimal(&s).map_err(de::Error::custom)
    }
}

/// Draw parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawConfig {
    /// Tie-break rounds attempted before the minimum-id fallback
    pub tie_breaker_rounds: u32,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            tie_breaker_rounds: DEFAULT_TIE_BREAKER_ROUNDS,
        }
    }
}

impl DrawConfig {
    pub fn with_rounds(tie_breaker_rounds: u32) -> Self {
        Self { tie_breaker_rounds }
    }

    pub fn validate(&self) -> Result<(), LotteryError> {
        if self.tie_breaker_rounds == 0 {
            return Err(LotteryError::InvalidConfig(
                "tie_breaker_rounds must be > 0".into(),
            ));
        }
        if self.tie_breaker_rounds > MAX_TIE_BREAKER_ROUNDS {
            return Err(LotteryError::InvalidConfig(format!(
                "tie_breaker_rounds must be <= {}",
                MAX_TIE_BREAKER_ROUNDS
            )));
        }
        Ok(())
    }
}
