//! Byte sizes written the way people write them in config files ("50MB", "512KiB")

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty size string")]
    Empty,

    #[error("invalid number in size '{0}'")]
    InvalidNumber(String),

    #[error("unknown size unit '{0}'")]
    InvalidUnit(String),

    #[error("size '{0}' overflows u64")]
    Overflow(String),
}

/// Byte count, parsed from either an integer or a string with a binary unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub const fn kib(n: u64) -> Self {
        Self(n * KIB)
    }

    pub const fn mib(n: u64) -> Self {
        Self(n * MIB)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Whether `len` bytes fit within this limit (inclusive)
    pub fn admits(&self, len: u64) -> bool {
        len <= self.0
    }
}

impl From<u64> for ByteSize {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for ByteSize {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Empty);
        }

        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit) = trimmed.split_at(split);

        let value: u64 = digits
            .parse()
            .map_err(|_| ParseError::InvalidNumber(trimmed.to_string()))?;

        let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
            "" | "B" => 1,
            "K" | "KB" | "KIB" => KIB,
            "M" | "MB" | "MIB" => MIB,
            "G" | "GB" | "GIB" => GIB,
            other => return Err(ParseError::InvalidUnit(other.to_string())),
        };

        value
            .checked_mul(multiplier)
            .map(ByteSize)
            .ok_or_else(|| ParseError::Overflow(trimmed.to_string()))
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(ByteSize(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl fmt::Display for ByteSize {
    /// Largest whole binary unit, e.g. `50MB`; falls back to bytes when not a whole multiple
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        match n {
            0 => write!(f, "0B"),
            _ if n % GIB == 0 => write!(f, "{}GB", n / GIB),
            _ if n % MIB == 0 => write!(f, "{}MB", n / MIB),
            _ if n % KIB == 0 => write!(f, "{}KB", n / KIB),
            _ => write!(f, "{}B", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_units_case_insensitively() {
        assert_eq!("50MB".parse::<ByteSize>().unwrap(), ByteSize::mib(50));
        assert_eq!("50mib".parse::<ByteSize>().unwrap(), ByteSize::mib(50));
        assert_eq!("10 KB".parse::<ByteSize>().unwrap(), ByteSize::kib(10));
        assert_eq!("2G".parse::<ByteSize>().unwrap().as_u64(), 2 * GIB);
        assert_eq!("1024".parse::<ByteSize>().unwrap().as_u64(), 1024);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!("".parse::<ByteSize>(), Err(ParseError::Empty));
        assert!(matches!("MB".parse::<ByteSize>(), Err(ParseError::InvalidNumber(_))));
        assert!(matches!("5PB".parse::<ByteSize>(), Err(ParseError::InvalidUnit(_))));
        assert!(matches!(
            "99999999999999G".parse::<ByteSize>(),
            Err(ParseError::Overflow(_))
        ));
    }

    #[test]
    fn admits_is_inclusive() {
        let limit = ByteSize::mib(50);
        assert!(limit.admits(50 * MIB));
        assert!(!limit.admits(50 * MIB + 1));
    }

    #[test]
    fn displays_largest_whole_unit() {
        assert_eq!(ByteSize::mib(50).to_string(), "50MB");
        assert_eq!(ByteSize::kib(3).to_string(), "3KB");
        assert_eq!(ByteSize(1500).to_string(), "1500B");
    }

    #[test]
    fn deserializes_string_or_number() {
        #[derive(Deserialize)]
        struct Limits {
            a: ByteSize,
            b: ByteSize,
        }
        let parsed: Limits = serde_json::from_str(r#"{"a": "10MB", "b": 2048}"#).unwrap();
        assert_eq!(parsed.a, ByteSize::mib(10));
        assert_eq!(parsed.b, ByteSize(2048));
    }
}
