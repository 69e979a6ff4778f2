//! 20-byte account and contract identifiers
//!
//! Every party the exchange deals with (providers, traders, pools, token
//! contracts) is named by an [`Address`]. Addresses render as `0x`-prefixed
//! lowercase hex and serialize as strings so they can key JSON maps.

use crate::errors::AddressError;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Ethereum-style 20-byte address
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Self = Self([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Address with every byte set to `byte`, handy for fixtures
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Deterministically derive a child address from a namespace and a seed
    ///
    /// Takes the last 20 bytes of `keccak256(namespace || seed)`, the same
    /// shape CREATE2 uses, so the result is stable across restarts.
    pub fn derive(namespace: &[u8], seed: &Address) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(namespace);
        hasher.update(seed.0);
        let digest = hasher.finalize();

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[12..32]);
        Self(bytes)
    }

    /// Short form for log lines: first four bytes
    pub fn short(&self) -> String {
        format!("0x{}…", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let decoded = hex::decode(digits).map_err(|_| AddressError::InvalidHex {
            input: s.to_string(),
        })?;
        let bytes: [u8; 20] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength { len: decoded.len() })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let usdc: Address = "0x3a034FE373B6304f98b7A24A3F21C958946d4075".parse().unwrap();
        assert_eq!(
            usdc.to_string(),
            "0x3a034fe373b6304f98b7a24a3f21c958946d4075"
        );

        let unprefixed: Address = "3a034fe373b6304f98b7a24a3f21c958946d4075".parse().unwrap();
        assert_eq!(usdc, unprefixed);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            "0x1234".parse::<Address>(),
            Err(AddressError::InvalidLength { len: 2 })
        ));
        assert!(matches!(
            "0xzz034fe373b6304f98b7a24a3f21c958946d4075".parse::<Address>(),
            Err(AddressError::InvalidHex { .. })
        ));
    }

    #[test]
    fn test_derive_is_deterministic() {
        let token = Address::repeat_byte(7);
        let a = Address::derive(b"laswap-pool", &token);
        let b = Address::derive(b"laswap-pool", &token);
        assert_eq!(a, b);
        assert_ne!(a, Address::derive(b"laswap-pool", &Address::repeat_byte(8)));
        assert_ne!(a, token);
    }

    #[test]
    fn test_serde_as_string() {
        let addr = Address::repeat_byte(0xab);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
