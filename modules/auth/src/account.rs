//! Account records
//!
//! The set of account variants is closed: every record stored by the
//! registry is one of the `Account` variants below.

use acctreg_core::{AccountNumber, Address, RegistryError, RegistryResult, Sequence};
use acctreg_crypto::module_address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capabilities every stored account exposes
pub trait AccountI {
    fn address(&self) -> &Address;

    /// Set the address; fails once an address has been assigned
    fn set_address(&mut self, address: Address) -> RegistryResult<()>;

    fn pub_key(&self) -> Option<&[u8]>;

    fn set_pub_key(&mut self, pub_key: Option<Vec<u8>>) -> RegistryResult<()>;

    fn account_number(&self) -> AccountNumber;

    fn set_account_number(&mut self, number: AccountNumber) -> RegistryResult<()>;

    fn sequence(&self) -> Sequence;

    fn set_sequence(&mut self, sequence: Sequence) -> RegistryResult<()>;
}

/// Plain key-controlled account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BaseAccount {
    pub address: Address,
    pub pub_key: Option<Vec<u8>>,
    pub account_number: AccountNumber,
    pub sequence: Sequence,
}

impl BaseAccount {
    pub fn new(
        address: Address,
        pub_key: Option<Vec<u8>>,
        account_number: AccountNumber,
        sequence: Sequence,
    ) -> Self {
        Self {
            address,
            pub_key,
            account_number,
            sequence,
        }
    }

    pub fn with_address(address: Address) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }

    /// Check the record is fit to be stored
    pub fn validate(&self) -> RegistryResult<()> {
        Address::verify_format(self.address.as_bytes())?;
        if let Some(pub_key) = &self.pub_key {
            if !acctreg_crypto::verify_address(&self.address, pub_key) {
                return Err(RegistryError::InvalidArgument(format!(
                    "account address {} does not match its public key",
                    self.address
                )));
            }
        }
        Ok(())
    }
}

impl AccountI for BaseAccount {
    fn address(&self) -> &Address {
        &self.address
    }

    fn set_address(&mut self, address: Address) -> RegistryResult<()> {
        if !self.address.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "cannot override account address".into(),
            ));
        }
        self.address = address;
        Ok(())
    }

    fn pub_key(&self) -> Option<&[u8]> {
        self.pub_key.as_deref()
    }

    fn set_pub_key(&mut self, pub_key: Option<Vec<u8>>) -> RegistryResult<()> {
        self.pub_key = pub_key;
        Ok(())
    }

    fn account_number(&self) -> AccountNumber {
        self.account_number
    }

    fn set_account_number(&mut self, number: AccountNumber) -> RegistryResult<()> {
        self.account_number = number;
        Ok(())
    }

    fn sequence(&self) -> Sequence {
        self.sequence
    }

    fn set_sequence(&mut self, sequence: Sequence) -> RegistryResult<()> {
        self.sequence = sequence;
        Ok(())
    }
}

/// Account owned by a module rather than a key pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAccount {
    pub base: BaseAccount,
    pub name: String,
    pub permissions: Vec<String>,
}

impl ModuleAccount {
    pub fn new(name: &str, permissions: Vec<String>) -> Self {
        Self {
            base: BaseAccount::with_address(module_address(name)),
            name: name.to_string(),
            permissions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn validate(&self) -> RegistryResult<()> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "module account name cannot be blank".into(),
            ));
        }
        if self.base.address != module_address(&self.name) {
            return Err(RegistryError::InvalidArgument(format!(
                "address {} cannot be derived from the module name '{}'",
                self.base.address, self.name
            )));
        }
        if self.base.pub_key.is_some() {
            return Err(RegistryError::InvalidArgument(format!(
                "module account {} cannot hold a public key",
                self.name
            )));
        }
        Ok(())
    }
}

impl AccountI for ModuleAccount {
    fn address(&self) -> &Address {
        self.base.address()
    }

    fn set_address(&mut self, address: Address) -> RegistryResult<()> {
        self.base.set_address(address)
    }

    fn pub_key(&self) -> Option<&[u8]> {
        None
    }

    fn set_pub_key(&mut self, _pub_key: Option<Vec<u8>>) -> RegistryResult<()> {
        Err(RegistryError::InvalidArgument(
            "not supported for module accounts".into(),
        ))
    }

    fn account_number(&self) -> AccountNumber {
        self.base.account_number()
    }

    fn set_account_number(&mut self, number: AccountNumber) -> RegistryResult<()> {
        self.base.set_account_number(number)
    }

    fn sequence(&self) -> Sequence {
        self.base.sequence()
    }

    fn set_sequence(&mut self, _sequence: Sequence) -> RegistryResult<()> {
        Err(RegistryError::InvalidArgument(
            "not supported for module accounts".into(),
        ))
    }
}

/// Any account the registry can store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Account {
    Base(BaseAccount),
    Module(ModuleAccount),
}

impl Account {
    /// Type tag used when the account travels inside an `Any`
    pub fn type_url(&self) -> &'static str {
        match self {
            Account::Base(_) => crate::any::BASE_ACCOUNT_TYPE_URL,
            Account::Module(_) => crate::any::MODULE_ACCOUNT_TYPE_URL,
        }
    }

    pub fn is_module(&self) -> bool {
        matches!(self, Account::Module(_))
    }

    pub fn as_module(&self) -> Option<&ModuleAccount> {
        match self {
            Account::Module(m) => Some(m),
            Account::Base(_) => None,
        }
    }

    pub fn into_module(self) -> Option<ModuleAccount> {
        match self {
            Account::Module(m) => Some(m),
            Account::Base(_) => None,
        }
    }

    pub fn validate(&self) -> RegistryResult<()> {
        match self {
            Account::Base(a) => a.validate(),
            Account::Module(m) => m.validate(),
        }
    }

    fn inner(&self) -> &dyn AccountI {
        match self {
            Account::Base(a) => a,
            Account::Module(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn AccountI {
        match self {
            Account::Base(a) => a,
            Account::Module(m) => m,
        }
    }
}

impl Default for Account {
    fn default() -> Self {
        Account::Base(BaseAccount::default())
    }
}

impl From<BaseAccount> for Account {
    fn from(account: BaseAccount) -> Self {
        Account::Base(account)
    }
}

impl From<ModuleAccount> for Account {
    fn from(account: ModuleAccount) -> Self {
        Account::Module(account)
    }
}

impl AccountI for Account {
    fn address(&self) -> &Address {
        self.inner().address()
    }

    fn set_address(&mut self, address: Address) -> RegistryResult<()> {
        self.inner_mut().set_address(address)
    }

    fn pub_key(&self) -> Option<&[u8]> {
        self.inner().pub_key()
    }

    fn set_pub_key(&mut self, pub_key: Option<Vec<u8>>) -> RegistryResult<()> {
        self.inner_mut().set_pub_key(pub_key)
    }

    fn account_number(&self) -> AccountNumber {
        self.inner().account_number()
    }

    fn set_account_number(&mut self, number: AccountNumber) -> RegistryResult<()> {
        self.inner_mut().set_account_number(number)
    }

    fn sequence(&self) -> Sequence {
        self.inner().sequence()
    }

    fn set_sequence(&mut self, sequence: Sequence) -> RegistryResult<()> {
        self.inner_mut().set_sequence(sequence)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Account::Base(a) => write!(f, "BaseAccount({} #{})", a.address, a.account_number),
            Account::Module(m) => write!(
                f,
                "ModuleAccount({} {} #{})",
                m.name, m.base.address, m.base.account_number
            ),
        }
    }
}
