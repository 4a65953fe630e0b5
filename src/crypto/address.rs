//! Account addresses
//!
//! An address is the first 20 bytes of the BLAKE3 hash of an x-only public key,
//! rendered as `0x`-prefixed lowercase hex.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::{hash_bytes, PublicKey};

pub const ADDRESS_LEN: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
    #[error("Invalid address length: expected {ADDRESS_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The null identity. Renounced ownership points here.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    pub fn from_public_key(key: &PublicKey) -> Self {
        let hash = hash_bytes(&key.0);
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&hash.0[..ADDRESS_LEN]);
        Address(bytes)
    }

    /// Deterministic address for a label, used for logic implementations
    /// and test fixtures that have no key behind them.
    pub fn derive(label: &[u8]) -> Self {
        let hash = hash_bytes(label);
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&hash.0[..ADDRESS_LEN]);
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        if bytes.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        let mut arr = [0u8; ADDRESS_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Address(arr))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PrivateKey;

    #[test]
    fn test_parse_with_and_without_prefix() {
        let addr = Address::derive(b"alice");
        let with_prefix: Address = addr.to_hex().parse().unwrap();
        let without: Address = addr.to_hex()[2..].parse().unwrap();
        assert_eq!(addr, with_prefix);
        assert_eq!(addr, without);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert_eq!(
            "0xdeadbeef".parse::<Address>(),
            Err(AddressError::InvalidLength(4))
        );
    }

    #[test]
    fn test_zero() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::derive(b"bob").is_zero());
    }

    #[test]
    fn test_address_from_key_is_stable() {
        let key = PrivateKey::generate().public_key();
        assert_eq!(Address::from_public_key(&key), Address::from_public_key(&key));
    }

    #[test]
    fn test_json_is_hex_string() {
        let addr = Address::derive(b"carol");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_hex()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
