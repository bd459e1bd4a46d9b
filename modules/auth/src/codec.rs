//! Binary encoding of stored accounts

use acctreg_core::{RegistryError, RegistryResult};

use crate::account::Account;

/// Encodes accounts for storage and decodes them back
pub trait AccountCodec: Send + Sync {
    fn marshal_account(&self, account: &Account) -> RegistryResult<Vec<u8>>;

    fn unmarshal_account(&self, bytes: &[u8]) -> RegistryResult<Account>;
}

/// Default codec: bincode over the tagged `Account` enum
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeAccountCodec;

impl AccountCodec for BincodeAccountCodec {
    fn marshal_account(&self, account: &Account) -> RegistryResult<Vec<u8>> {
        bincode::serialize(account).map_err(|e| RegistryError::SerializationError(e.to_string()))
    }

    fn unmarshal_account(&self, bytes: &[u8]) -> RegistryResult<Account> {
        bincode::deserialize(bytes).map_err(|e| RegistryError::DeserializationError(e.to_string()))
    }
}
