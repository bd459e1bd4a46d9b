//! Core types for ACCTREG
//!
//! Defines fundamental data structures used across the system.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RegistryError;
use crate::traits::RegistryResult;

/// Maximum length of an address in bytes
pub const MAX_ADDR_LEN: usize = 255;

/// Opaque account address.
///
/// Addresses are compared and ordered by their raw bytes, which is also the
/// order in which the account store iterates them.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Address(Vec<u8>);

impl Address {
    pub const EMPTY: Address = Address(Vec::new());

    /// Build an address, rejecting empty or oversized input
    pub fn new(bytes: impl Into<Vec<u8>>) -> RegistryResult<Self> {
        let bytes = bytes.into();
        Self::verify_format(&bytes)?;
        Ok(Address(bytes))
    }

    /// Check the length bounds every stored address must satisfy
    pub fn verify_format(bytes: &[u8]) -> RegistryResult<()> {
        if bytes.is_empty() {
            return Err(RegistryError::InvalidAddress("addresses cannot be empty".into()));
        }
        if bytes.len() > MAX_ADDR_LEN {
            return Err(RegistryError::InvalidAddress(format!(
                "address max length is {}, got {}",
                MAX_ADDR_LEN,
                bytes.len()
            )));
        }
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(s: &str) -> RegistryResult<Self> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| RegistryError::InvalidAddress(e.to_string()))?;
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = RegistryError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Address::new(bytes.to_vec())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", self.to_hex())
    }
}

/// Globally unique account number, assigned once at account creation
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct AccountNumber(pub u64);

impl AccountNumber {
    pub fn new(value: u64) -> Self {
        AccountNumber(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountNumber({})", self.0)
    }
}

/// Replay-protection sequence (sequential per account)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Sequence(pub u64);

impl Sequence {
    pub fn new(value: u64) -> Self {
        Sequence(value)
    }

    /// Following sequence; fails instead of wrapping at `u64::MAX`
    pub fn next(&self) -> RegistryResult<Sequence> {
        self.0
            .checked_add(1)
            .map(Sequence)
            .ok_or_else(|| RegistryError::InvalidArgument("sequence overflow".into()))
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sequence({})", self.0)
    }
}
