//! Address text encoding

use acctreg_core::{Address, RegistryError, RegistryResult};
use bech32::{FromBase32, ToBase32, Variant};

/// Converts between raw address bytes and their text form
pub trait AddressCodec: Send + Sync {
    fn bytes_to_string(&self, bytes: &[u8]) -> RegistryResult<String>;

    fn string_to_bytes(&self, text: &str) -> RegistryResult<Vec<u8>>;
}

/// Bech32 text encoding under a fixed human-readable prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bech32Codec {
    hrp: String,
}

impl Bech32Codec {
    pub fn new(hrp: &str) -> Self {
        Self {
            hrp: hrp.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.hrp
    }
}

impl AddressCodec for Bech32Codec {
    fn bytes_to_string(&self, bytes: &[u8]) -> RegistryResult<String> {
        Address::verify_format(bytes)?;
        bech32::encode(&self.hrp, bytes.to_base32(), Variant::Bech32)
            .map_err(|e| RegistryError::InvalidAddress(e.to_string()))
    }

    fn string_to_bytes(&self, text: &str) -> RegistryResult<Vec<u8>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RegistryError::InvalidAddress("empty address string is not allowed".into()));
        }

        let (hrp, data, variant) =
            bech32::decode(text).map_err(|e| RegistryError::InvalidAddress(e.to_string()))?;
        if hrp != self.hrp {
            return Err(RegistryError::InvalidAddress(format!(
                "invalid Bech32 prefix; expected {}, got {}",
                self.hrp, hrp
            )));
        }
        if variant != Variant::Bech32 {
            return Err(RegistryError::InvalidAddress("expected Bech32, got Bech32m".into()));
        }

        let bytes = Vec::<u8>::from_base32(&data)
            .map_err(|e| RegistryError::InvalidAddress(e.to_string()))?;
        Address::verify_format(&bytes)?;
        Ok(bytes)
    }
}
