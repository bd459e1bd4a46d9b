//! Type-erased account container
//!
//! Responses carry accounts as `Any` so every variant shares one shape; the
//! receiver picks the decoder from `type_url`.

use acctreg_core::{RegistryError, RegistryResult};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

use crate::account::{Account, BaseAccount, ModuleAccount};

pub const BASE_ACCOUNT_TYPE_URL: &str = "/acctreg.auth.v1.BaseAccount";
pub const MODULE_ACCOUNT_TYPE_URL: &str = "/acctreg.auth.v1.ModuleAccount";

/// Encoded value tagged with its concrete type
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Any {
    pub type_url: String,
    #[serde_as(as = "Base64")]
    pub value: Vec<u8>,
}

impl Any {
    /// Wrap an arbitrary serializable message under `type_url`
    pub fn new_with_value<T: Serialize>(type_url: &str, message: &T) -> RegistryResult<Self> {
        let value = bincode::serialize(message)
            .map_err(|e| RegistryError::SerializationError(e.to_string()))?;
        Ok(Self {
            type_url: type_url.to_string(),
            value,
        })
    }

    /// Pack an account, tagging its concrete variant
    pub fn pack(account: &Account) -> RegistryResult<Self> {
        match account {
            Account::Base(a) => Self::new_with_value(BASE_ACCOUNT_TYPE_URL, a),
            Account::Module(m) => Self::new_with_value(MODULE_ACCOUNT_TYPE_URL, m),
        }
    }

    /// Decode the account variant named by `type_url`
    pub fn unpack(&self) -> RegistryResult<Account> {
        match self.type_url.as_str() {
            BASE_ACCOUNT_TYPE_URL => Ok(Account::Base(self.decode::<BaseAccount>()?)),
            MODULE_ACCOUNT_TYPE_URL => Ok(Account::Module(self.decode::<ModuleAccount>()?)),
            other => Err(RegistryError::DeserializationError(format!(
                "unknown account type {}",
                other
            ))),
        }
    }

    pub fn is(&self, type_url: &str) -> bool {
        self.type_url == type_url
    }

    fn decode<T: serde::de::DeserializeOwned>(&self) -> RegistryResult<T> {
        bincode::deserialize(&self.value).map_err(|e| {
            RegistryError::DeserializationError(format!("{}: {}", self.type_url, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acctreg_core::{AccountNumber, Address, Sequence};

    #[test]
    fn test_pack_tags_variant() {
        let base = Account::Base(BaseAccount::new(
            Address::new(vec![1u8; 20]).unwrap(),
            None,
            AccountNumber::new(3),
            Sequence::new(7),
        ));
        let module = Account::Module(ModuleAccount::new("mint", vec![]));

        let packed_base = Any::pack(&base).unwrap();
        let packed_module = Any::pack(&module).unwrap();
        assert!(packed_base.is(BASE_ACCOUNT_TYPE_URL));
        assert!(packed_module.is(MODULE_ACCOUNT_TYPE_URL));

        assert_eq!(packed_base.unpack().unwrap(), base);
        assert_eq!(packed_module.unpack().unwrap(), module);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let any = Any {
            type_url: "/acctreg.auth.v1.VestingAccount".to_string(),
            value: vec![],
        };
        assert!(matches!(
            any.unpack(),
            Err(RegistryError::DeserializationError(_))
        ));
    }

    #[test]
    fn test_json_value_is_base64() {
        let any = Any {
            type_url: BASE_ACCOUNT_TYPE_URL.to_string(),
            value: vec![0xDE, 0xAD, 0xBE, 0xEF],
        };
        let json = serde_json::to_string(&any).unwrap();
        assert!(json.contains("\"3q2+7w==\""));
        let back: Any = serde_json::from_str(&json).unwrap();
        assert_eq!(back, any);
    }
}
