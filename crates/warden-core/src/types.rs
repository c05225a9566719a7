// crates/warden-core/src/types.rs
//
// Fixed-width identity and value types shared by every Warden crate.
//
// All of them render as `0x`-prefixed lowercase hex and parse from hex with or
// without the prefix. Serde uses the same text form so ledger values stay
// readable in JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WardenError;

/// Unix timestamp in seconds, as observed by the ledger.
pub type Timestamp = u64;

/// Number of 32-byte words in a Groth16-style proof.
pub const PROOF_WORDS: usize = 8;

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// All-zero value.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Parse from a hex string (optional `0x` prefix).
            pub fn from_hex(s: &str) -> Result<Self, WardenError> {
                let trimmed = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(trimmed)
                    .map_err(|e| WardenError::InvalidHex(format!("{}: {}", s, e)))?;
                let array: [u8; $len] = bytes.try_into().map_err(|v: Vec<u8>| {
                    WardenError::InvalidHex(format!(
                        "{}: expected {} bytes, got {}",
                        s,
                        $len,
                        v.len()
                    ))
                })?;
                Ok(Self(array))
            }

            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = WardenError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// A 20-byte account identity (user, vault, sentinel, protocol, verifier).
    Address,
    20
);

fixed_bytes!(
    /// A 256-bit unsigned integer in big-endian byte order.
    ///
    /// Used for Merkle roots, group ids, signal hashes, nullifier hashes,
    /// external-nullifier hashes and proof words.
    Field,
    32
);

fixed_bytes!(
    /// Opaque identifier of the off-chain risk report that justified an action.
    ReportId,
    32
);

impl Field {
    /// Encode a small integer as a big-endian 256-bit value.
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

/// Who is calling and when. Supplied by the ledger for every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// The account submitting the transaction.
    pub caller: Address,
    /// Ledger time of the transaction.
    pub timestamp: Timestamp,
}

impl CallContext {
    pub fn new(caller: Address, timestamp: Timestamp) -> Self {
        Self { caller, timestamp }
    }
}

/// Zero-knowledge proof material: exactly eight 256-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof(pub [Field; PROOF_WORDS]);

impl Proof {
    /// Build a proof from a word list, rejecting anything but eight words.
    pub fn from_words(words: Vec<Field>) -> Result<Self, WardenError> {
        let len = words.len();
        let array: [Field; PROOF_WORDS] = words
            .try_into()
            .map_err(|_| WardenError::MalformedProof { words: len })?;
        Ok(Self(array))
    }

    pub fn words(&self) -> &[Field; PROOF_WORDS] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address([0xab; 20]);
        let text = addr.to_string();
        assert_eq!(text, format!("0x{}", "ab".repeat(20)));
        assert_eq!(text.parse::<Address>().unwrap(), addr);
        assert_eq!(Address::from_hex(&"ab".repeat(20)).unwrap(), addr);
    }

    #[test]
    fn test_address_wrong_length_rejected() {
        let err = Address::from_hex("0x1234").unwrap_err();
        assert!(matches!(err, WardenError::InvalidHex(_)));
    }

    #[test]
    fn test_zero_detection() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address([1u8; 20]).is_zero());
        assert!(Field::ZERO.is_zero());
    }

    #[test]
    fn test_field_from_u64_is_big_endian() {
        let f = Field::from_u64(1);
        assert_eq!(f.0[31], 1);
        assert!(f.0[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_field_serde_as_hex_string() {
        let f = Field::from_u64(0x0102);
        let json = serde_json::to_string(&f).unwrap();
        assert!(json.ends_with("0102\""));
        let back: Field = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn test_proof_requires_eight_words() {
        assert!(Proof::from_words(vec![Field::ZERO; 8]).is_ok());
        let err = Proof::from_words(vec![Field::ZERO; 7]).unwrap_err();
        assert!(matches!(err, WardenError::MalformedProof { words: 7 }));
        assert!(Proof::from_words(vec![Field::ZERO; 9]).is_err());
    }
}
