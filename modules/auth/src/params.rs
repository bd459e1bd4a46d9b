//! Module parameters

use acctreg_core::{RegistryError, RegistryResult};
use serde::{Deserialize, Serialize};

/// Parameters stored alongside the account registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub max_memo_characters: u64,
    pub tx_sig_limit: u64,
    pub tx_size_cost_per_byte: u64,
    pub sig_verify_cost_ed25519: u64,
    pub sig_verify_cost_secp256k1: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_memo_characters: 256,
            tx_sig_limit: 7,
            tx_size_cost_per_byte: 10,
            sig_verify_cost_ed25519: 590,
            sig_verify_cost_secp256k1: 1000,
        }
    }
}

impl Params {
    pub fn validate(&self) -> RegistryResult<()> {
        let fields = [
            ("max_memo_characters", self.max_memo_characters),
            ("tx_sig_limit", self.tx_sig_limit),
            ("tx_size_cost_per_byte", self.tx_size_cost_per_byte),
            ("sig_verify_cost_ed25519", self.sig_verify_cost_ed25519),
            ("sig_verify_cost_secp256k1", self.sig_verify_cost_secp256k1),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(RegistryError::InvalidArgument(format!(
                    "invalid {}: must be positive",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> RegistryResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| RegistryError::SerializationError(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> RegistryResult<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| RegistryError::StateCorruption(format!("params: {}", e)))
    }
}
